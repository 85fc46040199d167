// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{RoleRepository, StudioRepository, TenantRepository, UserRepository},
    services::{
        auth::AuthService,
        oauth::GoogleOAuthClient,
        rbac::{RoleCache, RoleService},
        tenancy::TenantService,
        token::TokenIssuer,
    },
};

// Validade do token de sessão (7 dias) e do token de setup (1 hora)
const SESSION_TTL_SECS: i64 = 7 * 24 * 3600;
const SETUP_TTL_SECS: i64 = 3600;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub role_service: RoleService,
    pub role_cache: RoleCache,
    pub user_repo: UserRepository,
    pub studio_repo: StudioRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // OAuth do Google é opcional: sem as variáveis, o endpoint de
        // callback responde 401 e loga o motivo.
        let oauth = match (env::var("GOOGLE_CLIENT_ID"), env::var("GOOGLE_CLIENT_SECRET")) {
            (Ok(id), Ok(secret)) => Some(GoogleOAuthClient::new(id, secret)),
            _ => {
                tracing::warn!("GOOGLE_CLIENT_ID/SECRET ausentes; login Google desabilitado");
                None
            }
        };

        let role_cache_ttl = env::var("ROLE_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(RoleCache::DEFAULT_TTL);

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let studio_repo = StudioRepository::new(db_pool.clone());

        let role_cache = RoleCache::new(Arc::new(role_repo.clone()), role_cache_ttl);

        let issuer = TokenIssuer::new(jwt_secret, SESSION_TTL_SECS, SETUP_TTL_SECS);

        let auth_service = AuthService::new(
            user_repo.clone(),
            tenant_repo.clone(),
            role_repo.clone(),
            issuer,
            oauth,
        );

        let tenant_service = TenantService::new(
            tenant_repo.clone(),
            user_repo.clone(),
            role_repo.clone(),
            db_pool.clone(),
            role_cache.clone(),
        );

        let role_service = RoleService::new(role_repo, db_pool.clone(), role_cache.clone());

        Ok(Self {
            db_pool,
            auth_service,
            tenant_service,
            role_service,
            role_cache,
            user_repo,
            studio_repo,
        })
    }
}
