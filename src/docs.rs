// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::setup_password,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::verify_token,
        handlers::auth::refresh_token,
        handlers::auth::google_callback,

        // --- Tenancy ---
        handlers::tenants::create_tenant,
        handlers::tenants::list_tenants,
        handlers::tenants::deactivate_tenant,

        // --- Users ---
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::change_password,

        // --- RBAC ---
        handlers::roles::list_permissions,
        handlers::roles::list_roles,
        handlers::roles::create_role,
        handlers::roles::update_role,
        handlers::roles::delete_role,

        // --- Studio ---
        handlers::studio::create_project,
        handlers::studio::list_projects,
        handlers::studio::create_event,
        handlers::studio::list_events,
        handlers::studio::create_image,
        handlers::studio::list_images,
        handlers::studio::create_finance_entry,
        handlers::studio::list_finance_entries,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::SetupPasswordPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::GoogleCallbackPayload,
            models::auth::ChangePasswordPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,
            models::auth::PasswordSetupResponse,
            models::auth::VerifyTokenResponse,
            models::auth::TokenResponse,
            models::auth::GoogleAuthResponse,

            // --- Tenancy ---
            models::tenancy::Tenant,
            models::tenancy::CreateTenantPayload,
            models::tenancy::TenantCreatedResponse,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::CreateRolePayload,
            models::rbac::UpdateRolePayload,
            models::rbac::PermissionInfo,

            // --- Studio ---
            models::studio::Project,
            models::studio::CreateProjectPayload,
            models::studio::Event,
            models::studio::CreateEventPayload,
            models::studio::Image,
            models::studio::CreateImagePayload,
            models::studio::FinanceEntry,
            models::studio::CreateFinanceEntryPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, tokens e recuperação de senha"),
        (name = "Tenancy", description = "Gestão de Estabelecimentos (superadmin)"),
        (name = "Users", description = "Usuários do Estabelecimento"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Studio", description = "Projetos, Eventos, Imagens e Finanças")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
