// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentUser,
    services::rbac::{check_permission, Permission},
};

/// 1. O Trait que liga um tipo-marcador a uma permissão do sistema
pub trait PermissionDef: Send + Sync + 'static {
    fn permission() -> Permission;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai o usuário autenticado (o auth_guard já rodou)
        let current = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Carrega o registro de cargos (cacheado com TTL)
        let roles = app_state.role_cache.load_roles().await;

        // C. Consulta a tabela estática. Falha fechada: cargo fora do
        // registro nega, mesmo em permissões de lista vazia.
        let required = T::permission();
        if !check_permission(&current.claims.role, required, &roles) {
            return Err(AppError::Forbidden(required.slug().to_string()));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission_def {
    ($name:ident, $perm:expr) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn permission() -> Permission {
                $perm
            }
        }
    };
}

permission_def!(PermTenantsManage, Permission::TenantsManage);
permission_def!(PermUsersManage, Permission::UsersManage);
permission_def!(PermRolesManage, Permission::RolesManage);
permission_def!(PermProjectsRead, Permission::ProjectsRead);
permission_def!(PermProjectsWrite, Permission::ProjectsWrite);
permission_def!(PermEventsRead, Permission::EventsRead);
permission_def!(PermEventsWrite, Permission::EventsWrite);
permission_def!(PermImagesRead, Permission::ImagesRead);
permission_def!(PermImagesWrite, Permission::ImagesWrite);
permission_def!(PermFinanceRead, Permission::FinanceRead);
permission_def!(PermFinanceWrite, Permission::FinanceWrite);
