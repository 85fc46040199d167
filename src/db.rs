pub mod role_repo;
pub mod studio_repo;
pub mod tenant_repo;
pub mod user_repo;

pub use role_repo::RoleRepository;
pub use studio_repo::StudioRepository;
pub use tenant_repo::TenantRepository;
pub use user_repo::UserRepository;
