// src/db/studio_repo.rs
//
// Repositório dos dados de negócio (projetos, eventos, imagens, finanças).
// INVARIANTE: toda query aqui filtra por tenant_id. Um registro de outro
// estabelecimento simplesmente não existe para o chamador.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::studio::{
        CreateEventPayload, CreateFinanceEntryPayload, CreateImagePayload, CreateProjectPayload,
        Event, FinanceEntry, Image, Project,
    },
};

#[derive(Clone)]
pub struct StudioRepository {
    pool: PgPool,
}

impl StudioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Projects
    // ---

    pub async fn create_project(
        &self,
        tenant_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (tenant_id, name, client_name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.client_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn list_projects(&self, tenant_id: Uuid) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn find_project(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    // ---
    // Events
    // ---

    pub async fn create_event(
        &self,
        tenant_id: Uuid,
        payload: &CreateEventPayload,
    ) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (tenant_id, project_id, name, location, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.project_id)
        .bind(&payload.name)
        .bind(&payload.location)
        .bind(payload.starts_at)
        .bind(payload.ends_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn list_events(&self, tenant_id: Uuid) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE tenant_id = $1 ORDER BY starts_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn find_event(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Event>, AppError> {
        let event =
            sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND tenant_id = $2")
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(event)
    }

    // ---
    // Images
    // ---

    pub async fn create_image(
        &self,
        tenant_id: Uuid,
        payload: &CreateImagePayload,
    ) -> Result<Image, AppError> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (tenant_id, event_id, file_name, url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.event_id)
        .bind(&payload.file_name)
        .bind(&payload.url)
        .fetch_one(&self.pool)
        .await?;

        Ok(image)
    }

    pub async fn list_images(&self, tenant_id: Uuid) -> Result<Vec<Image>, AppError> {
        let images = sqlx::query_as::<_, Image>(
            "SELECT * FROM images WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }

    // ---
    // Finance
    // ---

    pub async fn create_finance_entry(
        &self,
        tenant_id: Uuid,
        payload: &CreateFinanceEntryPayload,
    ) -> Result<FinanceEntry, AppError> {
        let entry = sqlx::query_as::<_, FinanceEntry>(
            r#"
            INSERT INTO finance_entries (tenant_id, project_id, description, kind, amount, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payload.project_id)
        .bind(&payload.description)
        .bind(&payload.kind)
        .bind(payload.amount)
        .bind(payload.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn list_finance_entries(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<FinanceEntry>, AppError> {
        let entries = sqlx::query_as::<_, FinanceEntry>(
            "SELECT * FROM finance_entries WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
