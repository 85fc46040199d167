pub mod auth;
pub mod rbac;
pub mod studio;
pub mod tenancy;
