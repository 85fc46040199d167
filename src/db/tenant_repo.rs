// src/db/tenant_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Tenant};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Cria o estabelecimento. Aceita um executor para participar da
    // transação de signup (tenant + cargos + admin, tudo ou nada).
    pub async fn create_tenant<'e, E>(
        &self,
        executor: E,
        name: &str,
        username: &str,
        subscription_starts_at: Option<DateTime<Utc>>,
        subscription_ends_at: Option<DateTime<Utc>>,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, username, subscription_starts_at, subscription_ends_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(username)
        .bind(subscription_starts_at)
        .bind(subscription_ends_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UsernameAlreadyExists;
                }
            }
            e.into()
        })?;

        Ok(tenant)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let maybe_tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_tenant)
    }

    pub async fn list_all(&self) -> Result<Vec<Tenant>, AppError> {
        let tenants = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(tenants)
    }

    // Ativa/desativa. A cascata para os usuários acontece na VERIFICAÇÃO
    // de token (que checa tenants.is_active), não mutando cada usuário.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Tenant, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET is_active = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TenantNotFound)?;

        Ok(tenant)
    }
}
