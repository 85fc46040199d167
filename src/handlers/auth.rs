// src/handlers/auth.rs

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, ForgotPasswordPayload, GoogleAuthResponse, GoogleCallbackPayload,
        LoginPayload, PasswordSetupResponse, ResetPasswordPayload, SetupPasswordPayload,
        TokenResponse, VerifyTokenResponse,
    },
    services::auth::LoginOutcome,
};

// Handler de login. Duas respostas possíveis: sessão autenticada, ou o
// pedido de setup de senha do primeiro acesso.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada ou setup pendente", body = AuthResponse),
        (status = 401, description = "Não autorizado"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    let response = match outcome {
        LoginOutcome::Authenticated { token, user } => {
            Json(AuthResponse { token, user }).into_response()
        }
        LoginOutcome::SetupRequired { setup_token, email } => Json(PasswordSetupResponse {
            require_password_setup: true,
            setup_token,
            email,
        })
        .into_response(),
    };

    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/auth/setup-password",
    tag = "Auth",
    request_body = SetupPasswordPayload,
    responses(
        (status = 200, description = "Senha definida"),
        (status = 401, description = "Token inválido ou já utilizado"),
    )
)]
pub async fn setup_password(
    State(app_state): State<AppState>,
    Json(payload): Json<SetupPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .setup_password(&payload.token, &payload.password)
        .await?;

    Ok(Json(json!({ "message": "Senha definida com sucesso." })))
}

// Sempre responde 200, exista a conta ou não (anti-enumeração)
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses((status = 200, description = "Solicitação registrada"))
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(json!({
        "message": "Se o e-mail existir, as instruções de recuperação foram enviadas."
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 200, description = "Senha redefinida"),
        (status = 401, description = "Token inválido ou vencido"),
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .auth_service
        .reset_password(&payload.token, &payload.password)
        .await?;

    Ok(Json(json!({ "message": "Senha redefinida com sucesso." })))
}

// Rota protegida: se o auth_guard deixou passar, o token é válido.
#[utoipa::path(
    get,
    path = "/api/auth/verify-token",
    tag = "Auth",
    security(("api_jwt" = [])),
    responses((status = 200, body = VerifyTokenResponse))
)]
pub async fn verify_token(
    AuthenticatedUser(current): AuthenticatedUser,
) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        valid: true,
        user: current.user,
    })
}

// Refresh explícito: re-resolve cargo e tenant no banco. É o único ponto,
// fora o re-login, em que uma mudança de cargo passa a valer.
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "Auth",
    security(("api_jwt" = [])),
    responses((status = 200, body = TokenResponse))
)]
pub async fn refresh_token(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
) -> Result<Json<TokenResponse>, AppError> {
    let token = app_state
        .auth_service
        .refresh_token(current.user.id)
        .await?;

    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/auth/google/callback",
    tag = "Auth",
    request_body = GoogleCallbackPayload,
    responses(
        (status = 200, body = GoogleAuthResponse),
        (status = 401, description = "Não autorizado"),
    )
)]
pub async fn google_callback(
    State(app_state): State<AppState>,
    Json(payload): Json<GoogleCallbackPayload>,
) -> Result<Json<GoogleAuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user, tenant) = app_state
        .auth_service
        .google_login(&payload.code, &payload.redirect_uri)
        .await?;

    Ok(Json(GoogleAuthResponse { token, user, tenant }))
}
