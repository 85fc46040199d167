// src/handlers/studio.rs
//
// CRUD fino dos dados de negócio. O tenant vem SEMPRE do token (nunca do
// payload); referências a outros registros (project_id, event_id) são
// verificadas contra o tenant do chamador antes do insert — um ID de
// outro estabelecimento é um 403, não um "não achei".

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            PermEventsRead, PermEventsWrite, PermFinanceRead, PermFinanceWrite, PermImagesRead,
            PermImagesWrite, PermProjectsRead, PermProjectsWrite, RequirePermission,
        },
    },
    models::studio::{
        CreateEventPayload, CreateFinanceEntryPayload, CreateImagePayload, CreateProjectPayload,
        Event, FinanceEntry, Image, Project,
    },
};

// ---
// Projects
// ---

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Studio",
    security(("api_jwt" = [])),
    request_body = CreateProjectPayload,
    responses((status = 201, body = Project))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermProjectsWrite>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let project = app_state
        .studio_repo
        .create_project(current.claims.tenant_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Studio",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Project]))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermProjectsRead>,
) -> Result<Json<Vec<Project>>, AppError> {
    let projects = app_state
        .studio_repo
        .list_projects(current.claims.tenant_id)
        .await?;
    Ok(Json(projects))
}

// ---
// Events
// ---

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Studio",
    security(("api_jwt" = [])),
    request_body = CreateEventPayload,
    responses(
        (status = 201, body = Event),
        (status = 403, description = "Projeto de outro estabelecimento"),
    )
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermEventsWrite>,
    Json(payload): Json<CreateEventPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let tenant_id = current.claims.tenant_id;

    // O projeto referenciado precisa ser do mesmo tenant
    if let Some(project_id) = payload.project_id {
        ensure_project_in_tenant(&app_state, tenant_id, project_id).await?;
    }

    let event = app_state.studio_repo.create_event(tenant_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Studio",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Event]))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermEventsRead>,
) -> Result<Json<Vec<Event>>, AppError> {
    let events = app_state
        .studio_repo
        .list_events(current.claims.tenant_id)
        .await?;
    Ok(Json(events))
}

// ---
// Images
// ---

#[utoipa::path(
    post,
    path = "/api/images",
    tag = "Studio",
    security(("api_jwt" = [])),
    request_body = CreateImagePayload,
    responses(
        (status = 201, body = Image),
        (status = 403, description = "Evento de outro estabelecimento"),
    )
)]
pub async fn create_image(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermImagesWrite>,
    Json(payload): Json<CreateImagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let tenant_id = current.claims.tenant_id;

    if let Some(event_id) = payload.event_id {
        let exists = app_state
            .studio_repo
            .find_event(tenant_id, event_id)
            .await?
            .is_some();
        if !exists {
            tracing::warn!(%tenant_id, %event_id, "Imagem apontando para evento fora do tenant");
            return Err(AppError::CrossTenantDenied);
        }
    }

    let image = app_state.studio_repo.create_image(tenant_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(image)))
}

#[utoipa::path(
    get,
    path = "/api/images",
    tag = "Studio",
    security(("api_jwt" = [])),
    responses((status = 200, body = [Image]))
)]
pub async fn list_images(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermImagesRead>,
) -> Result<Json<Vec<Image>>, AppError> {
    let images = app_state
        .studio_repo
        .list_images(current.claims.tenant_id)
        .await?;
    Ok(Json(images))
}

// ---
// Finance
// ---

#[utoipa::path(
    post,
    path = "/api/finance",
    tag = "Studio",
    security(("api_jwt" = [])),
    request_body = CreateFinanceEntryPayload,
    responses(
        (status = 201, body = FinanceEntry),
        (status = 403, description = "Projeto de outro estabelecimento"),
    )
)]
pub async fn create_finance_entry(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermFinanceWrite>,
    Json(payload): Json<CreateFinanceEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let tenant_id = current.claims.tenant_id;

    if let Some(project_id) = payload.project_id {
        ensure_project_in_tenant(&app_state, tenant_id, project_id).await?;
    }

    let entry = app_state
        .studio_repo
        .create_finance_entry(tenant_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/finance",
    tag = "Studio",
    security(("api_jwt" = [])),
    responses((status = 200, body = [FinanceEntry]))
)]
pub async fn list_finance_entries(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    _perm: RequirePermission<PermFinanceRead>,
) -> Result<Json<Vec<FinanceEntry>>, AppError> {
    let entries = app_state
        .studio_repo
        .list_finance_entries(current.claims.tenant_id)
        .await?;
    Ok(Json(entries))
}

async fn ensure_project_in_tenant(
    app_state: &AppState,
    tenant_id: Uuid,
    project_id: Uuid,
) -> Result<(), AppError> {
    let exists = app_state
        .studio_repo
        .find_project(tenant_id, project_id)
        .await?
        .is_some();

    if !exists {
        tracing::warn!(%tenant_id, %project_id, "Referência a projeto fora do tenant");
        return Err(AppError::CrossTenantDenied);
    }
    Ok(())
}
