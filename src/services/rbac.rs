// src/services/rbac.rs
//
// O coração do controle de acesso:
//  - a tabela estática permissão -> cargos autorizados (match exaustivo,
//    sem comparação de strings espalhada pelo código);
//  - o portão de autorização (funções puras, sem IO);
//  - o cache do registro de cargos com TTL e troca atômica;
//  - o serviço de CRUD de cargos, que limpa o cache a cada mutação.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RoleRepository,
    models::rbac::{PermissionInfo, Role},
};

// ---
// 1. Cargos de fábrica
// ---

// Os cargos que a tabela estática de permissões conhece. Cargos
// customizados criados pelos estabelecimentos também existem no registro,
// mas só passam nas permissões de lista vazia ("qualquer cargo").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Superadmin,
    Admin,
    Gerente,
    Fotografo,
    Financeiro,
}

impl RoleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleKind::Superadmin => "superadmin",
            RoleKind::Admin => "admin",
            RoleKind::Gerente => "gerente",
            RoleKind::Fotografo => "fotografo",
            RoleKind::Financeiro => "financeiro",
        }
    }
}

// Único cargo global: atravessa a checagem de igualdade de tenant
pub const GLOBAL_ROLE: RoleKind = RoleKind::Superadmin;

pub fn is_global_role(role_name: &str) -> bool {
    role_name.eq_ignore_ascii_case(GLOBAL_ROLE.as_str())
}

// ---
// 2. Permissões
// ---

// Conjunto FECHADO de permissões. Por ser um enum, não existe "chave não
// mapeada": o match em allowed_roles é exaustivo e o compilador cobra
// cada variante nova.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    TenantsManage,
    UsersManage,
    RolesManage,
    ProjectsRead,
    ProjectsWrite,
    EventsRead,
    EventsWrite,
    ImagesRead,
    ImagesWrite,
    FinanceRead,
    FinanceWrite,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::TenantsManage,
        Permission::UsersManage,
        Permission::RolesManage,
        Permission::ProjectsRead,
        Permission::ProjectsWrite,
        Permission::EventsRead,
        Permission::EventsWrite,
        Permission::ImagesRead,
        Permission::ImagesWrite,
        Permission::FinanceRead,
        Permission::FinanceWrite,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Permission::TenantsManage => "tenants:manage",
            Permission::UsersManage => "users:manage",
            Permission::RolesManage => "roles:manage",
            Permission::ProjectsRead => "projects:read",
            Permission::ProjectsWrite => "projects:write",
            Permission::EventsRead => "events:read",
            Permission::EventsWrite => "events:write",
            Permission::ImagesRead => "images:read",
            Permission::ImagesWrite => "images:write",
            Permission::FinanceRead => "finance:read",
            Permission::FinanceWrite => "finance:write",
        }
    }

    pub fn module(self) -> &'static str {
        match self {
            Permission::TenantsManage => "TENANTS",
            Permission::UsersManage => "USERS",
            Permission::RolesManage => "ROLES",
            Permission::ProjectsRead | Permission::ProjectsWrite => "PROJECTS",
            Permission::EventsRead | Permission::EventsWrite => "EVENTS",
            Permission::ImagesRead | Permission::ImagesWrite => "IMAGES",
            Permission::FinanceRead | Permission::FinanceWrite => "FINANCE",
        }
    }

    // A tabela estática. Lista VAZIA = qualquer cargo autenticado que
    // exista no registro (não é "ninguém"!).
    pub fn allowed_roles(self) -> &'static [RoleKind] {
        use RoleKind::*;
        match self {
            Permission::TenantsManage => &[Superadmin],
            Permission::UsersManage => &[Superadmin, Admin],
            Permission::RolesManage => &[Superadmin, Admin],
            Permission::ProjectsRead => &[],
            Permission::ProjectsWrite => &[Superadmin, Admin, Gerente],
            Permission::EventsRead => &[],
            Permission::EventsWrite => &[Superadmin, Admin, Gerente, Fotografo],
            Permission::ImagesRead => &[],
            Permission::ImagesWrite => &[Superadmin, Admin, Fotografo],
            Permission::FinanceRead => &[Superadmin, Admin, Financeiro],
            Permission::FinanceWrite => &[Superadmin, Admin, Financeiro],
        }
    }
}

// ---
// 3. O portão de autorização (funções puras)
// ---

// Decide permitir/negar. Falha FECHADA: cargo desconhecido (fora do
// registro) nega sempre, mesmo nas permissões de lista vazia.
pub fn check_permission(
    role_name: &str,
    permission: Permission,
    registry: &HashMap<String, Role>,
) -> bool {
    let role_name = role_name.to_lowercase();

    if !registry.contains_key(&role_name) {
        return false;
    }

    let allowed = permission.allowed_roles();
    if allowed.is_empty() {
        // Qualquer cargo registrado
        return true;
    }

    allowed.iter().any(|kind| kind.as_str() == role_name)
}

// Checagem de isolamento: o recurso precisa pertencer ao tenant do
// chamador, exceto para o cargo global.
pub fn ensure_tenant_access(
    role_name: &str,
    caller_tenant: Uuid,
    resource_tenant: Uuid,
) -> Result<(), AppError> {
    if is_global_role(role_name) {
        return Ok(());
    }
    if caller_tenant != resource_tenant {
        tracing::warn!(
            %caller_tenant,
            %resource_tenant,
            "Tentativa de acesso entre estabelecimentos bloqueada"
        );
        return Err(AppError::CrossTenantDenied);
    }
    Ok(())
}

// ---
// 4. O cache do registro de cargos
// ---

// A fonte persistente dos cargos. Trait para permitir um mock nos testes
// do cache (o repositório real implementa abaixo).
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn fetch_roles(&self) -> Result<Vec<Role>, AppError>;
}

#[async_trait]
impl RoleSource for RoleRepository {
    async fn fetch_roles(&self) -> Result<Vec<Role>, AppError> {
        self.load_all().await
    }
}

struct CacheState {
    // Arc para a troca ser atômica: um refresh monta o mapa NOVO por
    // completo e só então substitui o ponteiro. Leitores concorrentes
    // seguram a versão antiga sem ver estado parcial.
    roles: Arc<HashMap<String, Role>>,
    refreshed_at: Option<Instant>,
}

// Cache explicitamente injetável (nada de estado global de módulo):
// cada teste pode ter a sua instância isolada.
#[derive(Clone)]
pub struct RoleCache {
    source: Arc<dyn RoleSource>,
    ttl: Duration,
    state: Arc<RwLock<CacheState>>,
    // Single-flight do refresh: uma task por vez consulta a fonte
    refresh: Arc<Mutex<()>>,
}

impl RoleCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(source: Arc<dyn RoleSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Arc::new(RwLock::new(CacheState {
                roles: Arc::new(HashMap::new()),
                refreshed_at: None,
            })),
            refresh: Arc::new(Mutex::new(())),
        }
    }

    // Retorna o mapeamento nome-minúsculo -> cargo.
    //
    // Política de falha: se a fonte estiver fora do ar, devolve o último
    // mapa conhecido (leitura velha é melhor que indisponibilidade). Se
    // nunca houve carga com sucesso, devolve o mapa vazio e as checagens
    // de permissão negam tudo (falha fechada).
    //
    // O fetch roda FORA do RwLock: enquanto uma task atualiza, as demais
    // servem o snapshot atual em vez de esperar o banco.
    pub async fn load_roles(&self) -> Arc<HashMap<String, Role>> {
        if let Some(roles) = self.fresh_snapshot().await {
            return roles;
        }

        // Refresh já em andamento em outra task: serve o mapa antigo
        let Ok(_refresh) = self.refresh.try_lock() else {
            let state = self.state.read().await;
            return Arc::clone(&state.roles);
        };

        // O refresh anterior pode ter terminado enquanto disputávamos
        if let Some(roles) = self.fresh_snapshot().await {
            return roles;
        }

        match self.source.fetch_roles().await {
            Ok(roles) => {
                let mut map = HashMap::with_capacity(roles.len());
                for role in roles {
                    map.insert(role.name.to_lowercase(), role);
                }
                let mut state = self.state.write().await;
                state.roles = Arc::new(map);
                state.refreshed_at = Some(Instant::now());
                Arc::clone(&state.roles)
            }
            Err(e) => {
                // Mantém o mapa antigo e NÃO marca como atualizado: a
                // próxima chamada tenta de novo.
                tracing::warn!("Fonte de cargos indisponível, usando cache: {}", e);
                let state = self.state.read().await;
                Arc::clone(&state.roles)
            }
        }
    }

    async fn fresh_snapshot(&self) -> Option<Arc<HashMap<String, Role>>> {
        let state = self.state.read().await;
        let refreshed_at = state.refreshed_at?;
        (refreshed_at.elapsed() < self.ttl).then(|| Arc::clone(&state.roles))
    }

    // Deve ser chamado em toda criação/renomeação/remoção de cargo.
    // O TTL é apenas o limite de staleness de reserva.
    pub async fn clear_cache(&self) {
        let mut state = self.state.write().await;
        state.refreshed_at = None;
    }
}

// ---
// 5. O serviço de CRUD de cargos
// ---

#[derive(Clone)]
pub struct RoleService {
    repo: RoleRepository,
    pool: PgPool,
    cache: RoleCache,
}

impl RoleService {
    pub fn new(repo: RoleRepository, pool: PgPool, cache: RoleCache) -> Self {
        Self { repo, pool, cache }
    }

    pub async fn create_role(
        &self,
        tenant_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError> {
        let role = self
            .repo
            .create_role(&self.pool, Some(tenant_id), name, description)
            .await?;

        self.cache.clear_cache().await;
        Ok(role)
    }

    pub async fn update_role(
        &self,
        role_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError> {
        let role = self.repo.update_role(role_id, name, description).await?;
        self.cache.clear_cache().await;
        Ok(role)
    }

    pub async fn delete_role(&self, role_id: Uuid) -> Result<(), AppError> {
        self.repo.delete_role(role_id).await?;
        self.cache.clear_cache().await;
        Ok(())
    }

    pub async fn find_role(&self, role_id: Uuid) -> Result<Role, AppError> {
        self.repo
            .find_by_id(role_id)
            .await?
            .ok_or(AppError::RoleNotFound)
    }

    pub async fn list_visible(&self, tenant_id: Uuid) -> Result<Vec<Role>, AppError> {
        self.repo.list_visible(tenant_id).await
    }

    // Catálogo estático para o frontend montar a tela de cargos
    pub fn permissions_catalog(&self) -> Vec<PermissionInfo> {
        Permission::ALL
            .iter()
            .map(|p| PermissionInfo {
                slug: p.slug().to_string(),
                module: p.module().to_string(),
                allowed_roles: p
                    .allowed_roles()
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn role(name: &str, tenant_id: Option<Uuid>) -> Role {
        Role {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.to_string(),
            description: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn registry(names: &[&str]) -> HashMap<String, Role> {
        names
            .iter()
            .map(|n| {
                let tenant = if *n == "superadmin" {
                    None
                } else {
                    Some(Uuid::new_v4())
                };
                (n.to_string(), role(n, tenant))
            })
            .collect()
    }

    // ---
    // Portão de autorização
    // ---

    #[test]
    fn lista_preenchida_permite_apenas_cargos_listados() {
        let reg = registry(&["admin", "fotografo", "financeiro"]);

        assert!(check_permission("financeiro", Permission::FinanceWrite, &reg));
        assert!(check_permission("admin", Permission::FinanceWrite, &reg));
        assert!(!check_permission("fotografo", Permission::FinanceWrite, &reg));
    }

    #[test]
    fn lista_vazia_permite_qualquer_cargo_registrado() {
        // "assistente" é um cargo customizado de tenant, fora da tabela
        let reg = registry(&["assistente"]);

        assert!(check_permission("assistente", Permission::ProjectsRead, &reg));
        // Mas não passa em permissões com lista preenchida
        assert!(!check_permission("assistente", Permission::ProjectsWrite, &reg));
    }

    #[test]
    fn cargo_desconhecido_nega_sempre() {
        let reg = registry(&["admin"]);

        // Nem em lista vazia: falha fechada
        assert!(!check_permission("fantasma", Permission::ProjectsRead, &reg));
        assert!(!check_permission("fantasma", Permission::UsersManage, &reg));
    }

    #[test]
    fn registro_vazio_nega_tudo() {
        let reg = HashMap::new();
        assert!(!check_permission("admin", Permission::ProjectsRead, &reg));
        assert!(!check_permission("superadmin", Permission::TenantsManage, &reg));
    }

    #[test]
    fn nome_de_cargo_e_case_insensitive() {
        let reg = registry(&["admin"]);
        assert!(check_permission("Admin", Permission::UsersManage, &reg));
        assert!(check_permission("ADMIN", Permission::UsersManage, &reg));
    }

    #[test]
    fn tenant_diferente_e_negado() {
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();

        assert!(ensure_tenant_access("admin", t1, t1).is_ok());
        assert!(matches!(
            ensure_tenant_access("admin", t1, t2),
            Err(AppError::CrossTenantDenied)
        ));
    }

    #[test]
    fn superadmin_atravessa_tenants() {
        let t1 = Uuid::new_v4();
        let t2 = Uuid::new_v4();
        assert!(ensure_tenant_access("superadmin", t1, t2).is_ok());
    }

    // ---
    // Cache
    // ---

    struct MockSource {
        roles: Vec<Role>,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new(roles: Vec<Role>) -> Arc<Self> {
            Arc::new(Self {
                roles,
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RoleSource for MockSource {
        async fn fetch_roles(&self) -> Result<Vec<Role>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!(
                    "banco fora do ar"
                )));
            }
            Ok(self.roles.clone())
        }
    }

    #[tokio::test]
    async fn dentro_do_ttl_nao_consulta_a_fonte() {
        let source = MockSource::new(vec![role("admin", Some(Uuid::new_v4()))]);
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        let a = cache.load_roles().await;
        let b = cache.load_roles().await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(a.contains_key("admin"));
        // Mesmo mapa (troca atômica via Arc)
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn clear_cache_forca_nova_carga() {
        let source = MockSource::new(vec![role("admin", Some(Uuid::new_v4()))]);
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        cache.load_roles().await;
        cache.clear_cache().await;
        cache.load_roles().await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fonte_fora_do_ar_devolve_o_ultimo_mapa_bom() {
        let source = MockSource::new(vec![role("fotografo", Some(Uuid::new_v4()))]);
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        let before = cache.load_roles().await;
        assert!(before.contains_key("fotografo"));

        // O banco cai e o cache é invalidado
        source.fail.store(true, Ordering::SeqCst);
        cache.clear_cache().await;

        let after = cache.load_roles().await;
        assert!(after.contains_key("fotografo"));
        assert_eq!(before.len(), after.len());
    }

    #[tokio::test]
    async fn cache_vazio_com_fonte_fora_devolve_mapa_vazio() {
        let source = MockSource::new(vec![role("admin", Some(Uuid::new_v4()))]);
        source.fail.store(true, Ordering::SeqCst);
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        let roles = cache.load_roles().await;
        assert!(roles.is_empty());
        // E as checagens falham fechadas
        assert!(!check_permission("admin", Permission::UsersManage, &roles));
    }

    #[tokio::test]
    async fn falha_nao_marca_como_atualizado() {
        let source = MockSource::new(vec![role("admin", Some(Uuid::new_v4()))]);
        source.fail.store(true, Ordering::SeqCst);
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        cache.load_roles().await;
        cache.load_roles().await;

        // Cada chamada tentou a fonte de novo (sem "cachear" o erro)
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        // A fonte volta e a próxima carga enche o mapa
        source.fail.store(false, Ordering::SeqCst);
        let roles = cache.load_roles().await;
        assert!(roles.contains_key("admin"));
    }

    // Fonte que trava dentro do fetch até ser liberada, para simular um
    // banco lento no meio de um refresh
    struct SlowSource {
        roles: Vec<Role>,
        block: AtomicBool,
        entered: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl RoleSource for SlowSource {
        async fn fetch_roles(&self) -> Result<Vec<Role>, AppError> {
            if self.block.load(Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(self.roles.clone())
        }
    }

    #[tokio::test]
    async fn refresh_em_andamento_nao_bloqueia_leitores() {
        let source = Arc::new(SlowSource {
            roles: vec![role("admin", Some(Uuid::new_v4()))],
            block: AtomicBool::new(false),
            entered: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
        });
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        cache.load_roles().await;

        // A fonte fica lenta e o cache é invalidado
        source.block.store(true, Ordering::SeqCst);
        cache.clear_cache().await;

        let refresher = cache.clone();
        let handle = tokio::spawn(async move { refresher.load_roles().await });
        source.entered.notified().await;

        // Com o refresh preso na fonte, leitores recebem o mapa antigo
        // na hora, sem esperar
        let stale = cache.load_roles().await;
        assert!(stale.contains_key("admin"));

        source.release.notify_one();
        let fresh = handle.await.unwrap();
        assert!(fresh.contains_key("admin"));
    }

    #[tokio::test]
    async fn clear_e_duas_cargas_dao_o_mesmo_mapeamento() {
        let source = MockSource::new(vec![
            role("admin", Some(Uuid::new_v4())),
            role("superadmin", None),
        ]);
        let cache = RoleCache::new(source.clone(), Duration::from_secs(300));

        cache.clear_cache().await;
        let a = cache.load_roles().await;
        let b = cache.load_roles().await;

        assert_eq!(a.len(), b.len());
        for key in a.keys() {
            assert!(b.contains_key(key));
        }
    }
}
