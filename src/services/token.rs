// src/services/token.rs
//
// Emissão e verificação de JWTs. Dois tipos de token:
//  - sessão: {sub, tenant_id, role, token_version, exp, iat}
//  - setup:  {sub, email, purpose, exp, iat} — vida curta, sem escopo de
//    cargo/tenant, só serve para definir a senha do primeiro acesso.
//
// A expiração é absoluta: verify nunca renova nada.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, SetupClaims, User},
};

const SETUP_PURPOSE: &str = "password_setup";

#[derive(Clone)]
pub struct TokenIssuer {
    jwt_secret: String,
    session_ttl_secs: i64,
    setup_ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(jwt_secret: String, session_ttl_secs: i64, setup_ttl_secs: i64) -> Self {
        Self {
            jwt_secret,
            session_ttl_secs,
            setup_ttl_secs,
        }
    }

    // Emite o token de sessão "congelando" tenant e cargo no momento da
    // emissão. Mudanças de cargo só valem após re-login ou refresh.
    pub fn issue_session(&self, user: &User, role_name: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.session_ttl_secs);

        let claims = Claims {
            sub: user.id,
            tenant_id: user.tenant_id,
            role: role_name.to_lowercase(),
            token_version: user.token_version,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    // Decodifica e valida assinatura + expiração do token de sessão.
    // Qualquer problema vira o mesmo InvalidToken: o chamador loga o
    // motivo, o cliente só vê "não autorizado".
    pub fn verify_session(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::warn!("Token de sessão rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        Ok(token_data.claims)
    }

    pub fn issue_setup(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.setup_ttl_secs);

        let claims = SetupClaims {
            sub: user_id,
            email: email.to_string(),
            purpose: SETUP_PURPOSE.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub fn verify_setup(&self, token: &str) -> Result<SetupClaims, AppError> {
        let token_data = decode::<SetupClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::warn!("Token de setup rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        // Um token de sessão jamais pode passar por token de setup
        if token_data.claims.purpose != SETUP_PURPOSE {
            tracing::warn!("Token de setup com purpose inesperado");
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new("segredo-de-teste".into(), 3600, 900)
    }

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

    #[test]
    fn session_roundtrip_preserva_identidade() {
        let issuer = test_issuer();
        let user = test_user(3);

        let token = issuer.issue_session(&user, "Fotografo").unwrap();
        let claims = issuer.verify_session(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.tenant_id, user.tenant_id);
        // O nome do cargo é sempre normalizado para minúsculas
        assert_eq!(claims.role, "fotografo");
        assert_eq!(claims.token_version, 3);
    }

    #[test]
    fn token_congela_a_versao_da_emissao() {
        let issuer = test_issuer();
        let mut user = test_user(1);

        let token = issuer.issue_session(&user, "admin").unwrap();

        // Troca de senha: a versão persistida avança, o token antigo não
        user.token_version += 1;
        let claims = issuer.verify_session(&token).unwrap();
        assert_ne!(claims.token_version, user.token_version);
        assert_eq!(claims.token_version, 1);
    }

    #[test]
    fn token_adulterado_e_rejeitado() {
        let issuer = test_issuer();
        let user = test_user(1);

        let mut token = issuer.issue_session(&user, "admin").unwrap();
        // Corrompe o payload
        token.insert(20, 'x');

        assert!(matches!(
            issuer.verify_session(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn segredo_errado_e_rejeitado() {
        let issuer = test_issuer();
        let outro = TokenIssuer::new("outro-segredo".into(), 3600, 900);
        let user = test_user(1);

        let token = issuer.issue_session(&user, "admin").unwrap();
        assert!(matches!(
            outro.verify_session(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        // TTL negativo: o token já nasce vencido
        let issuer = TokenIssuer::new("segredo-de-teste".into(), -120, 900);
        let user = test_user(1);

        let token = issuer.issue_session(&user, "admin").unwrap();
        assert!(matches!(
            issuer.verify_session(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn setup_roundtrip() {
        let issuer = test_issuer();
        let user_id = Uuid::new_v4();

        let token = issuer.issue_setup(user_id, "novo@estudio.com").unwrap();
        let claims = issuer.verify_setup(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "novo@estudio.com");
    }

    #[test]
    fn token_de_sessao_nao_serve_como_setup() {
        let issuer = test_issuer();
        let user = test_user(1);

        let session = issuer.issue_session(&user, "admin").unwrap();
        // O decode até funciona se os campos baterem, mas o purpose não bate
        assert!(matches!(
            issuer.verify_setup(&session),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_de_setup_nao_serve_como_sessao() {
        let issuer = test_issuer();

        let setup = issuer.issue_setup(Uuid::new_v4(), "novo@estudio.com").unwrap();
        assert!(matches!(
            issuer.verify_session(&setup),
            Err(AppError::InvalidToken)
        ));
    }
}
