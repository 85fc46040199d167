// src/handlers/roles.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermRolesManage, RequirePermission},
    },
    models::rbac::{CreateRolePayload, PermissionInfo, Role, UpdateRolePayload},
    services::rbac::{ensure_tenant_access, is_global_role},
};

// GET /api/permissions — catálogo estático para o frontend montar a tela
// de criação de cargos
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, body = [PermissionInfo]))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
) -> Json<Vec<PermissionInfo>> {
    Json(app_state.role_service.permissions_catalog())
}

// Cargos visíveis: os do próprio estabelecimento + os globais
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Role]))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> Result<Json<Vec<Role>>, AppError> {
    let roles = app_state
        .role_service
        .list_visible(current.claims.tenant_id)
        .await?;
    Ok(Json(roles))
}

// POST /api/roles — sempre no escopo do tenant do chamador
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = CreateRolePayload,
    responses(
        (status = 201, body = Role),
        (status = 409, description = "Nome de cargo já em uso no estabelecimento"),
    )
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermRolesManage>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let role = app_state
        .role_service
        .create_role(
            current.claims.tenant_id,
            &payload.name,
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "RBAC",
    security(("api_jwt" = [])),
    params(("id" = Uuid, Path, description = "ID do cargo")),
    request_body = UpdateRolePayload,
    responses(
        (status = 200, body = Role),
        (status = 403, description = "Cargo de outro estabelecimento"),
        (status = 404, description = "Cargo não encontrado"),
    )
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermRolesManage>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<Json<Role>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    ensure_role_scope(&app_state, &current.claims.role, current.claims.tenant_id, id).await?;

    let role = app_state
        .role_service
        .update_role(id, &payload.name, payload.description.as_deref())
        .await?;

    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "RBAC",
    security(("api_jwt" = [])),
    params(("id" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Cargo removido"),
        (status = 403, description = "Cargo de outro estabelecimento"),
        (status = 409, description = "Cargo em uso por usuários"),
    )
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermRolesManage>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role_scope(&app_state, &current.claims.role, current.claims.tenant_id, id).await?;

    app_state.role_service.delete_role(id).await?;

    Ok(Json(json!({ "message": "Cargo removido com sucesso." })))
}

// O cargo alvo precisa pertencer ao estabelecimento do chamador. Cargos
// globais só podem ser tocados pelo superadmin.
async fn ensure_role_scope(
    app_state: &AppState,
    caller_role: &str,
    caller_tenant: Uuid,
    role_id: Uuid,
) -> Result<(), AppError> {
    let role = app_state.role_service.find_role(role_id).await?;

    match role.tenant_id {
        Some(role_tenant) => ensure_tenant_access(caller_role, caller_tenant, role_tenant),
        None => {
            if is_global_role(caller_role) {
                Ok(())
            } else {
                Err(AppError::CrossTenantDenied)
            }
        }
    }
}
