// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados.
// Cada usuário pertence a exatamente UM estabelecimento (tenant_id imutável).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,

    // NULL = primeiro acesso pendente (fluxo de setup de senha)
    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: Option<String>,

    pub role_id: Uuid,
    pub is_active: bool,

    // Incrementado a cada troca de senha: invalida todos os tokens antigos
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub token_version: i32,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_password_token: Option<String>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub reset_password_expires: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Estrutura de dados ("claims") dentro do JWT de sessão.
// Tenant e cargo são "congelados" na emissão: mudança de cargo só vale
// após re-login ou refresh explícito (trade-off deliberado de performance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,          // ID do usuário
    pub tenant_id: Uuid,    // Estabelecimento dono
    pub role: String,       // Nome do cargo (minúsculo)
    pub token_version: i32, // Comparado com o valor persistido na verificação
    pub exp: usize,
    pub iat: usize,
}

// Claims do token de setup de senha: escopo mínimo, sem cargo nem tenant.
// Só serve para definir a senha do primeiro acesso, uma única vez.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupClaims {
    pub sub: Uuid,
    pub email: String,
    pub purpose: String, // sempre "password_setup"
    pub exp: usize,
    pub iat: usize,
}

// ---
// Payloads (os "formulários" da API)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetupPasswordPayload {
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 1, message = "O token é obrigatório."))]
    pub token: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCallbackPayload {
    #[validate(length(min = 1, message = "O código de autorização é obrigatório."))]
    pub code: String,
    #[validate(length(min = 1, message = "O redirectUri é obrigatório."))]
    pub redirect_uri: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    pub role_id: Uuid,
}

// ---
// Respostas
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Resposta do login quando o usuário ainda não definiu a senha
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordSetupResponse {
    pub require_password_setup: bool,
    pub setup_token: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// Resposta do callback OAuth: além do usuário, devolve o estabelecimento
// para o SPA montar o contexto sem uma segunda chamada
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthResponse {
    pub token: String,
    pub user: User,
    pub tenant: crate::models::tenancy::Tenant,
}
