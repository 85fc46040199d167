// src/handlers/tenants.rs
//
// Gestão de estabelecimentos: exclusiva do cargo global (superadmin).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermTenantsManage, RequirePermission},
    models::tenancy::{CreateTenantPayload, Tenant, TenantCreatedResponse},
};

#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenancy",
    security(("api_jwt" = [])),
    request_body = CreateTenantPayload,
    responses(
        (status = 201, body = TenantCreatedResponse),
        (status = 403, description = "Permissão insuficiente"),
        (status = 409, description = "Username já em uso"),
    )
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTenantsManage>,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (tenant, admin) = app_state
        .tenant_service
        .create_tenant_with_admin(&payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TenantCreatedResponse { tenant, admin }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenancy",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Tenant]))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTenantsManage>,
) -> Result<Json<Vec<Tenant>>, AppError> {
    let tenants = app_state.tenant_service.list_tenants().await?;
    Ok(Json(tenants))
}

// Desativação em vez de remoção: os dados do estabelecimento permanecem,
// mas nenhum usuário dele consegue mais autenticar.
#[utoipa::path(
    put,
    path = "/api/tenants/{id}/deactivate",
    tag = "Tenancy",
    security(("api_jwt" = [])),
    params(("id" = Uuid, Path, description = "ID do estabelecimento")),
    responses(
        (status = 200, body = Tenant),
        (status = 404, description = "Estabelecimento não encontrado"),
    )
)]
pub async fn deactivate_tenant(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTenantsManage>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tenant>, AppError> {
    let tenant = app_state.tenant_service.deactivate_tenant(id).await?;
    Ok(Json(tenant))
}
