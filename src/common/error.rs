use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
//
// Regra de segurança: falhas de AUTENTICAÇÃO (credencial errada, token
// expirado/adulterado, versão antiga, tenant inativo) respondem todas com o
// mesmo 401 genérico. O motivo real fica apenas no log, para não permitir
// enumeração de contas.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Permissão '{0}' necessária")]
    Forbidden(String),

    #[error("Acesso a dados de outro estabelecimento")]
    CrossTenantDenied,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Username já existe")]
    UsernameAlreadyExists,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Estabelecimento não encontrado")]
    TenantNotFound,

    #[error("Cargo não encontrado")]
    RoleNotFound,

    #[error("Estabelecimento inativo")]
    TenantInactive,

    #[error("Falha na autenticação OAuth")]
    OAuthFailed,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // 401 genérico: as três variantes respondem o mesmo texto de
            // propósito. O motivo real já foi logado por quem gerou o erro.
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::OAuthFailed => {
                (StatusCode::UNAUTHORIZED, "Não autorizado.".to_string())
            }

            AppError::Forbidden(perm) => (
                StatusCode::FORBIDDEN,
                format!("Você precisa da permissão '{}' para realizar esta ação.", perm),
            ),

            // Tentativa de tocar dados de outro tenant: falha DURA de
            // autorização, nunca um filtro silencioso.
            AppError::CrossTenantDenied => (
                StatusCode::FORBIDDEN,
                "Acesso negado a dados de outro estabelecimento.".to_string(),
            ),

            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::UsernameAlreadyExists => {
                (StatusCode::CONFLICT, "Este username já está em uso.".to_string())
            }
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),

            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::TenantNotFound => (
                StatusCode::NOT_FOUND,
                "Estabelecimento não encontrado.".to_string(),
            ),
            AppError::RoleNotFound => {
                (StatusCode::NOT_FOUND, "Cargo não encontrado.".to_string())
            }

            AppError::TenantInactive => (
                StatusCode::CONFLICT,
                "Este estabelecimento está desativado.".to_string(),
            ),

            // Todos os outros erros viram 500. O `tracing` loga a mensagem
            // detalhada que o `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
