// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Tenant (O "Estabelecimento")
// ---
// A conta principal: um estúdio de fotografia. Todo dado de negócio
// (projeto, evento, imagem, lançamento financeiro) é particionado por ele.
// Nunca é apagado fisicamente enquanto houver dados que o referenciam:
// apenas desativado (is_active = false).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    // Identificador público do estúdio (usado nas URLs do site)
    pub username: String,
    pub is_active: bool,
    pub subscription_starts_at: Option<DateTime<Utc>>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que o superadmin envia para criar um estabelecimento.
// O primeiro usuário (admin) nasce junto, sem senha: recebe o fluxo
// de setup no primeiro login.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 1, message = "O nome do estabelecimento é obrigatório."))]
    pub name: String,

    #[validate(length(min = 3, message = "O username deve ter no mínimo 3 caracteres."))]
    pub username: String,

    #[validate(length(min = 1, message = "O nome do administrador é obrigatório."))]
    pub admin_name: String,

    #[validate(email(message = "O e-mail do administrador é inválido."))]
    pub admin_email: String,

    pub subscription_starts_at: Option<DateTime<Utc>>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
}

// Resposta da criação: o estabelecimento + o admin recém-criado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreatedResponse {
    pub tenant: Tenant,
    pub admin: crate::models::auth::User,
}
