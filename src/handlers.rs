pub mod auth;
pub mod roles;
pub mod studio;
pub mod tenants;
pub mod users;
