// src/services/tenancy.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RoleRepository, TenantRepository, UserRepository},
    models::{
        auth::{CreateUserPayload, User},
        tenancy::{CreateTenantPayload, Tenant},
    },
    services::rbac::{ensure_tenant_access, RoleCache},
};

// Cargos criados de fábrica em todo estabelecimento novo
const SEED_ROLES: &[(&str, &str)] = &[
    ("admin", "Administrador do estúdio, acesso total ao estabelecimento"),
    ("gerente", "Gerencia projetos, eventos e a agenda"),
    ("fotografo", "Fotografa eventos e gerencia as próprias imagens"),
    ("financeiro", "Controla receitas e despesas"),
];

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
    user_repo: UserRepository,
    role_repo: RoleRepository,
    pool: PgPool,
    role_cache: RoleCache,
}

impl TenantService {
    pub fn new(
        tenant_repo: TenantRepository,
        user_repo: UserRepository,
        role_repo: RoleRepository,
        pool: PgPool,
        role_cache: RoleCache,
    ) -> Self {
        Self {
            tenant_repo,
            user_repo,
            role_repo,
            pool,
            role_cache,
        }
    }

    // LÓGICA DE NEGÓCIO: cria o estabelecimento e, atomicamente, os seus
    // cargos de fábrica e o primeiro admin. O admin nasce sem senha e
    // recebe o fluxo de setup no primeiro login.
    pub async fn create_tenant_with_admin(
        &self,
        payload: &CreateTenantPayload,
    ) -> Result<(Tenant, User), AppError> {
        // 1. Inicia a transação: ou nasce tudo, ou nada
        let mut tx = self.pool.begin().await?;

        // 2. Cria o estabelecimento
        let tenant = self
            .tenant_repo
            .create_tenant(
                &mut *tx,
                &payload.name,
                &payload.username,
                payload.subscription_starts_at,
                payload.subscription_ends_at,
            )
            .await?;

        // 3. Cria os cargos de fábrica, guardando o de admin
        let mut admin_role_id: Option<Uuid> = None;
        for (name, description) in SEED_ROLES {
            let role = self
                .role_repo
                .create_role(&mut *tx, Some(tenant.id), name, Some(description))
                .await?;
            if *name == "admin" {
                admin_role_id = Some(role.id);
            }
        }
        let admin_role_id =
            admin_role_id.ok_or_else(|| anyhow::anyhow!("Seed de cargos sem 'admin'"))?;

        // 4. Cria o primeiro usuário com o cargo de admin
        let admin = self
            .user_repo
            .create_user(
                &mut *tx,
                tenant.id,
                &payload.admin_name,
                &payload.admin_email,
                admin_role_id,
            )
            .await?;

        // 5. Commit
        tx.commit().await?;

        // Cargos novos existem: o registro em cache precisa ser recarregado
        self.role_cache.clear_cache().await;

        tracing::info!(tenant_id = %tenant.id, "Estabelecimento criado com admin inicial");
        Ok((tenant, admin))
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, AppError> {
        self.tenant_repo.list_all().await
    }

    // Desativa o estabelecimento. Nenhum usuário é alterado: a verificação
    // de token checa tenants.is_active e derruba todos no próximo request.
    pub async fn deactivate_tenant(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        let tenant = self.tenant_repo.set_active(tenant_id, false).await?;
        tracing::info!(tenant_id = %tenant.id, "Estabelecimento desativado");
        Ok(tenant)
    }

    // Cria um usuário no estabelecimento do chamador.
    // Regras: o tenant precisa estar ATIVO e o cargo atribuído precisa
    // pertencer ao próprio tenant (cargos globais não são atribuíveis aqui).
    pub async fn create_user(
        &self,
        tenant_id: Uuid,
        caller_role: &str,
        payload: &CreateUserPayload,
    ) -> Result<User, AppError> {
        let tenant = self
            .tenant_repo
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)?;

        if !tenant.is_active {
            return Err(AppError::TenantInactive);
        }

        let role = self
            .role_repo
            .find_by_id(payload.role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        match role.tenant_id {
            Some(role_tenant) => {
                // Cargo de outro estabelecimento: falha dura de autorização
                ensure_tenant_access(caller_role, tenant_id, role_tenant)?;
            }
            None => {
                // Cargo global só pode ser atribuído pelo superadmin
                if !crate::services::rbac::is_global_role(caller_role) {
                    return Err(AppError::Forbidden("tenants:manage".into()));
                }
            }
        }

        let user = self
            .user_repo
            .create_user(
                &self.pool,
                tenant_id,
                &payload.name,
                &payload.email,
                payload.role_id,
            )
            .await?;

        tracing::info!(user_id = %user.id, tenant_id = %tenant_id, "Usuário criado (aguardando setup de senha)");
        Ok(user)
    }
}
