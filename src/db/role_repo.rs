// src/db/role_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::rbac::Role};

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Cria um cargo. tenant_id = None cria um cargo GLOBAL (só o seed de
    // migração usa isso hoje; a API sempre cria no escopo do tenant).
    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        tenant_id: Option<Uuid>,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (tenant_id, name, description)
            VALUES ($1, lower($2), $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um cargo com esse nome neste estabelecimento.".into(),
                    );
                }
            }
            e.into()
        })?;

        Ok(role)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let maybe_role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_role)
    }

    // Cargos visíveis para um estabelecimento: os dele + os globais
    pub async fn list_visible(&self, tenant_id: Uuid) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            r#"
            SELECT * FROM roles
            WHERE tenant_id = $1 OR tenant_id IS NULL
            ORDER BY tenant_id NULLS FIRST, name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    // Carga completa para o cache do registro de cargos
    pub async fn load_all(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn update_role(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = lower($2), description = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um cargo com esse nome neste estabelecimento.".into(),
                    );
                }
            }
            AppError::from(e)
        })?
        .ok_or(AppError::RoleNotFound)?;

        Ok(role)
    }

    pub async fn delete_role(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // FK de users.role_id: cargo em uso não pode sumir
                    if db_err.is_foreign_key_violation() {
                        return AppError::UniqueConstraintViolation(
                            "Este cargo está em uso por usuários e não pode ser removido.".into(),
                        );
                    }
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::RoleNotFound);
        }
        Ok(())
    }
}
