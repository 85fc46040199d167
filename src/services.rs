pub mod auth;
pub mod oauth;
pub mod rbac;
pub mod tenancy;
pub mod token;
