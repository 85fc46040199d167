// src/services/oauth.rs
//
// Cliente do fluxo "authorization code" do Google: o SPA manda o código
// recebido no callback e o backend troca por um access token para ler o
// perfil (e-mail) do usuário.

use serde::Deserialize;

use crate::common::error::AppError;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
        }
    }

    // Troca o código de autorização pelo access token.
    // Qualquer falha vira OAuthFailed (401 genérico); o detalhe fica no log.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, AppError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Falha ao contactar o endpoint de token do Google: {}", e);
                AppError::OAuthFailed
            })?;

        if !response.status().is_success() {
            tracing::warn!("Google recusou o código de autorização: {}", response.status());
            return Err(AppError::OAuthFailed);
        }

        let body: TokenExchangeResponse = response.json().await.map_err(|e| {
            tracing::warn!("Resposta inesperada do endpoint de token: {}", e);
            AppError::OAuthFailed
        })?;

        Ok(body.access_token)
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, AppError> {
        let profile = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!("Falha ao buscar o perfil no Google: {}", e);
                AppError::OAuthFailed
            })?
            .json::<GoogleProfile>()
            .await
            .map_err(|e| {
                tracing::warn!("Perfil do Google em formato inesperado: {}", e);
                AppError::OAuthFailed
            })?;

        Ok(profile)
    }
}
