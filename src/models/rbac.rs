// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O que sai do banco (Tabela Roles).
// tenant_id = NULL significa cargo GLOBAL do sistema (ex: superadmin),
// visível a todos os estabelecimentos. Caso contrário o cargo pertence a
// um único estabelecimento e é invisível para os demais.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    pub tenant_id: Option<Uuid>,

    #[schema(example = "fotografo")]
    pub name: String,

    #[schema(example = "Fotografa eventos e gerencia as próprias imagens")]
    pub description: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// O Payload para criar um cargo (sempre no escopo do tenant do chamador)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "O nome do cargo é obrigatório."))]
    #[schema(example = "assistente")]
    pub name: String,

    #[schema(example = "Pode apenas visualizar projetos e eventos")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolePayload {
    #[validate(length(min = 1, message = "O nome do cargo é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
}

// Descrição de uma permissão do sistema (para o frontend montar telas)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionInfo {
    #[schema(example = "projects:write")]
    pub slug: String,

    #[schema(example = "PROJECTS")]
    pub module: String,

    // Nomes dos cargos de fábrica autorizados; vazio = qualquer cargo
    // autenticado registrado
    pub allowed_roles: Vec<String>,
}
