// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não
    // deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação públicas (sem Bearer)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/setup-password", post(handlers::auth::setup_password))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .route("/google/callback", post(handlers::auth::google_callback));

    // Rotas de token (protegidas: o auth_guard roda a verificação completa)
    let session_routes = Router::new()
        .route("/verify-token", get(handlers::auth::verify_token))
        .route("/refresh-token", post(handlers::auth::refresh_token))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Gestão de estabelecimentos (o RequirePermission dentro dos handlers
    // restringe ao superadmin)
    let tenant_routes = Router::new()
        .route(
            "/",
            post(handlers::tenants::create_tenant).get(handlers::tenants::list_tenants),
        )
        .route(
            "/{id}/deactivate",
            put(handlers::tenants::deactivate_tenant),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let user_routes = Router::new()
        .route(
            "/",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route("/{id}/password", put(handlers::users::change_password))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let role_routes = Router::new()
        .route(
            "/",
            post(handlers::roles::create_role).get(handlers::roles::list_roles),
        )
        .route(
            "/{id}",
            put(handlers::roles::update_role).delete(handlers::roles::delete_role),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Dados de negócio: tudo implicitamente escopado pelo tenant do token
    let studio_routes = Router::new()
        .route(
            "/projects",
            post(handlers::studio::create_project).get(handlers::studio::list_projects),
        )
        .route(
            "/events",
            post(handlers::studio::create_event).get(handlers::studio::list_events),
        )
        .route(
            "/images",
            post(handlers::studio::create_image).get(handlers::studio::list_images),
        )
        .route(
            "/finance",
            post(handlers::studio::create_finance_entry)
                .get(handlers::studio::list_finance_entries),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let permissions_route = Router::new()
        .route("/permissions", get(handlers::roles::list_permissions))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes.merge(session_routes))
        .nest("/api/tenants", tenant_routes)
        .nest("/api/users", user_routes)
        .nest("/api/roles", role_routes)
        .nest("/api", studio_routes.merge(permissions_route))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
