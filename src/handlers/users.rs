// src/handlers/users.rs

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
        rbac::{PermUsersManage, RequirePermission},
    },
    models::auth::{ChangePasswordPayload, CreateUserPayload, User},
    services::rbac::{check_permission, ensure_tenant_access, Permission},
};

// Cria um usuário no estabelecimento do chamador. O convite nasce sem
// senha: o primeiro login dispara o fluxo de setup.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    request_body = CreateUserPayload,
    responses(
        (status = 201, body = User),
        (status = 403, description = "Permissão insuficiente"),
        (status = 409, description = "E-mail já em uso ou estabelecimento inativo"),
    )
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermUsersManage>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state
        .tenant_service
        .create_user(current.claims.tenant_id, &current.claims.role, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, body = [User]))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermUsersManage>,
) -> Result<Json<Vec<User>>, AppError> {
    // Sempre o tenant embutido no token: não existe "listar de outro"
    let users = app_state
        .user_repo
        .list_by_tenant(current.claims.tenant_id)
        .await?;
    Ok(Json(users))
}

// Troca de senha: o próprio usuário, ou alguém com users:manage do MESMO
// estabelecimento. Incrementa token_version: derruba as sessões antigas.
#[utoipa::path(
    put,
    path = "/api/users/{id}/password",
    tag = "Users",
    security(("api_jwt" = [])),
    params(("id" = Uuid, Path, description = "ID do usuário alvo")),
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada"),
        (status = 403, description = "Sem permissão sobre este usuário"),
        (status = 404, description = "Usuário não encontrado"),
    )
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Path(target_id): Path<Uuid>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if current.user.id != target_id {
        // Não é a própria senha: exige users:manage...
        let roles = app_state.role_cache.load_roles().await;
        if !check_permission(&current.claims.role, Permission::UsersManage, &roles) {
            return Err(AppError::Forbidden(Permission::UsersManage.slug().into()));
        }

        // ...e o alvo precisa ser do mesmo estabelecimento (superadmin passa)
        let target = app_state
            .user_repo
            .find_by_id(target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        ensure_tenant_access(&current.claims.role, current.claims.tenant_id, target.tenant_id)?;
    }

    app_state
        .auth_service
        .change_password(target_id, &payload.password)
        .await?;

    Ok(Json(json!({ "message": "Senha alterada com sucesso." })))
}
