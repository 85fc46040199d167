// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RoleRepository, TenantRepository, UserRepository},
    models::{auth::{Claims, User}, tenancy::Tenant},
    services::{oauth::GoogleOAuthClient, token::TokenIssuer},
};

// Validade do token de recuperação de senha (1 hora)
const RESET_TOKEN_TTL_SECS: i64 = 3600;

// Resultado do login: ou autentica, ou o usuário ainda precisa definir a
// senha do primeiro acesso.
pub enum LoginOutcome {
    Authenticated { token: String, user: User },
    SetupRequired { setup_token: String, email: String },
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    role_repo: RoleRepository,
    issuer: TokenIssuer,
    oauth: Option<GoogleOAuthClient>,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenant_repo: TenantRepository,
        role_repo: RoleRepository,
        issuer: TokenIssuer,
        oauth: Option<GoogleOAuthClient>,
    ) -> Self {
        Self {
            user_repo,
            tenant_repo,
            role_repo,
            issuer,
            oauth,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Login com e-mail desconhecido");
                AppError::InvalidCredentials
            })?;

        // Todos os motivos de recusa abaixo respondem o MESMO 401.
        self.ensure_account_enabled(&user).await?;

        // Primeiro acesso: nada de senha ainda. Emite o token de setup,
        // que não carrega cargo nem tenant.
        let Some(password_hash) = user.password_hash.clone() else {
            let setup_token = self.issuer.issue_setup(user.id, &user.email)?;
            return Ok(LoginOutcome::SetupRequired {
                setup_token,
                email: user.email,
            });
        };

        // Verificação do bcrypt em thread separada para não travar o runtime
        let password_clone = password.to_owned();
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::warn!(user_id = %user.id, "Senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        let role_name = self.resolve_role_name(&user).await?;
        let token = self.issuer.issue_session(&user, &role_name)?;

        Ok(LoginOutcome::Authenticated { token, user })
    }

    // Define a senha do primeiro acesso. O token de setup só funciona
    // enquanto password_hash for NULL: depois disso ele morre sozinho.
    pub async fn setup_password(&self, token: &str, password: &str) -> Result<(), AppError> {
        let claims = self.issuer.verify_setup(token)?;

        let password_hash = Self::hash_password(password).await?;

        let updated = self
            .user_repo
            .set_initial_password(claims.sub, &password_hash)
            .await?;

        if !updated {
            tracing::warn!(user_id = %claims.sub, "Token de setup reutilizado ou usuário inexistente");
            return Err(AppError::InvalidToken);
        }

        tracing::info!(user_id = %claims.sub, "Senha do primeiro acesso definida");
        Ok(())
    }

    // Sempre responde sucesso, exista o e-mail ou não (anti-enumeração).
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            tracing::info!("Recuperação solicitada para e-mail desconhecido");
            return Ok(());
        };

        let token = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        let expires = Utc::now() + chrono::Duration::seconds(RESET_TOKEN_TTL_SECS);

        self.user_repo.set_reset_token(user.id, &token, expires).await?;

        // TODO: disparar o e-mail de recuperação quando o worker de
        // notificações entrar; por ora o token só existe no banco.
        tracing::info!(user_id = %user.id, "Token de recuperação gerado");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Token de recuperação inválido ou vencido");
                AppError::InvalidToken
            })?;

        let password_hash = Self::hash_password(password).await?;

        // update_password incrementa token_version: todas as sessões
        // antigas morrem aqui.
        self.user_repo.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Senha redefinida via token de recuperação");
        Ok(())
    }

    // Troca de senha por um usuário autenticado (ou por um admin).
    // Também invalida todos os tokens emitidos antes.
    pub async fn change_password(&self, user_id: Uuid, password: &str) -> Result<(), AppError> {
        let password_hash = Self::hash_password(password).await?;
        self.user_repo.update_password(user_id, &password_hash).await?;
        tracing::info!(user_id = %user_id, "Senha alterada; sessões anteriores invalidadas");
        Ok(())
    }

    // A verificação completa do token de sessão:
    //   assinatura/expiração -> usuário existe e ativo -> token_version
    //   confere -> tenant ativo.
    // Cada recusa loga o motivo real e devolve o MESMO 401 genérico.
    pub async fn validate_token(&self, token: &str) -> Result<(Claims, User), AppError> {
        let claims = self.issuer.verify_session(token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %claims.sub, "Token de usuário inexistente");
                AppError::InvalidToken
            })?;

        ensure_version_current(&claims, &user)?;

        self.ensure_account_enabled(&user).await?;

        Ok((claims, user))
    }

    // Refresh explícito: re-resolve cargo e tenant no banco, o único ponto
    // (fora o re-login) em que uma mudança de cargo passa a valer.
    pub async fn refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        self.ensure_account_enabled(&user).await?;

        let role_name = self.resolve_role_name(&user).await?;
        self.issuer.issue_session(&user, &role_name)
    }

    // Callback do OAuth: troca o código, lê o e-mail do perfil e autentica
    // o usuário correspondente. Conta desconhecida = 401 genérico.
    pub async fn google_login(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<(String, User, Tenant), AppError> {
        let Some(oauth) = &self.oauth else {
            tracing::warn!("Callback OAuth recebido, mas o Google não está configurado");
            return Err(AppError::OAuthFailed);
        };

        let access_token = oauth.exchange_code(code, redirect_uri).await?;
        let profile = oauth.fetch_profile(&access_token).await?;

        let user = self
            .user_repo
            .find_by_email(&profile.email)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Login Google com e-mail sem conta");
                AppError::InvalidCredentials
            })?;

        let tenant = self.ensure_account_enabled(&user).await?;

        let role_name = self.resolve_role_name(&user).await?;
        let token = self.issuer.issue_session(&user, &role_name)?;

        Ok((token, user, tenant))
    }

    // ---
    // Auxiliares
    // ---

    // Carrega o tenant dono e aplica as checagens de ativação
    async fn ensure_account_enabled(&self, user: &User) -> Result<Tenant, AppError> {
        let tenant = self
            .tenant_repo
            .find_by_id(user.tenant_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(tenant_id = %user.tenant_id, "Usuário órfão de estabelecimento");
                AppError::InvalidCredentials
            })?;

        ensure_enabled(user, &tenant)?;
        Ok(tenant)
    }

    async fn resolve_role_name(&self, user: &User) -> Result<String, AppError> {
        let role = self
            .role_repo
            .find_by_id(user.role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;
        Ok(role.name)
    }

    async fn hash_password(password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(password_hash)
    }
}

// ---
// Checagens puras da verificação (separadas do IO dos repositórios)
// ---

// Compara a versão embutida no token com a persistida no usuário. Toda
// troca de senha incrementa a versão: tokens emitidos antes morrem aqui.
fn ensure_version_current(claims: &Claims, user: &User) -> Result<(), AppError> {
    if user.token_version != claims.token_version {
        tracing::warn!(
            user_id = %user.id,
            token_version = claims.token_version,
            current_version = user.token_version,
            "Token de versão antiga rejeitado"
        );
        return Err(AppError::InvalidToken);
    }
    Ok(())
}

// Usuário ativo + tenant dono ativo. A desativação de um tenant derruba
// todos os seus usuários por aqui, sem mexer em cada registro.
fn ensure_enabled(user: &User, tenant: &Tenant) -> Result<(), AppError> {
    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Usuário desativado");
        return Err(AppError::InvalidCredentials);
    }
    if !tenant.is_active {
        tracing::warn!(tenant_id = %tenant.id, "Estabelecimento desativado");
        return Err(AppError::InvalidCredentials);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(token_version: i32) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@estudio.com".into(),
            password_hash: Some("$2b$12$hash".into()),
            role_id: Uuid::new_v4(),
            is_active: true,
            token_version,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_tenant(is_active: bool) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Estúdio Luz".into(),
            username: "estudio-luz".into(),
            is_active,
            subscription_starts_at: None,
            subscription_ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_de_versao_antiga_e_rejeitado() {
        let issuer = TokenIssuer::new("segredo-de-teste".into(), 3600, 900);
        let mut user = test_user(1);

        let token = issuer.issue_session(&user, "admin").unwrap();
        let claims = issuer.verify_session(&token).unwrap();

        // Antes da troca de senha o token passa
        assert!(ensure_version_current(&claims, &user).is_ok());

        // A troca incrementa a versão persistida: o token antigo morre
        user.token_version += 1;
        assert!(matches!(
            ensure_version_current(&claims, &user),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn usuario_desativado_e_recusado() {
        let mut user = test_user(1);
        user.is_active = false;
        let tenant = test_tenant(true);

        assert!(matches!(
            ensure_enabled(&user, &tenant),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn tenant_desativado_derruba_os_usuarios() {
        let user = test_user(1);

        assert!(ensure_enabled(&user, &test_tenant(true)).is_ok());
        assert!(matches!(
            ensure_enabled(&user, &test_tenant(false)),
            Err(AppError::InvalidCredentials)
        ));
    }
}
