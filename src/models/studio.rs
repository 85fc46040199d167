// src/models/studio.rs
//
// Dados de negócio do estúdio. São CRUDs finos: a única regra que importa
// aqui é que TODO registro carrega tenant_id e todo acesso filtra por ele.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Project (O "Trabalho" contratado: casamento, ensaio, book...)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub client_name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "O nome do projeto é obrigatório."))]
    pub name: String,
    pub client_name: Option<String>,
}

// ---
// 2. Event (A "Sessão": data, local, ligada ou não a um projeto)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Option<Uuid>,
    pub name: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    #[validate(length(min = 1, message = "O nome do evento é obrigatório."))]
    pub name: String,
    pub project_id: Option<Uuid>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

// ---
// 3. Image (Metadado da foto; o arquivo em si fica no storage externo)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub event_id: Option<Uuid>,
    pub file_name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateImagePayload {
    #[validate(length(min = 1, message = "O nome do arquivo é obrigatório."))]
    pub file_name: String,
    #[validate(url(message = "A URL da imagem é inválida."))]
    pub url: String,
    pub event_id: Option<Uuid>,
}

// ---
// 4. FinanceEntry (Lançamento financeiro: receita ou despesa)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Option<Uuid>,
    pub description: String,
    pub kind: String,
    pub amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFinanceEntryPayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    // 'receita' ou 'despesa'
    #[validate(custom(function = "validate_entry_kind"))]
    pub kind: String,

    pub amount: Decimal,
    pub project_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

fn validate_entry_kind(kind: &str) -> Result<(), validator::ValidationError> {
    if kind != "receita" && kind != "despesa" {
        let mut err = validator::ValidationError::new("entry_kind");
        err.message = Some("O tipo deve ser 'receita' ou 'despesa'.".into());
        return Err(err);
    }
    Ok(())
}
