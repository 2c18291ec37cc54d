use super::ValidJson;
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{
    AuthenticatedResponse, LoginRequest, RegisterRequest, RegisterResponse, TokenResponse,
};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};

pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let token = state
        .auth
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    state.rate_limiter.check_rate_limit(
        &format!("login:{}", payload.username.trim().to_lowercase()),
        state.config.login_limit,
    )?;

    let token = state
        .auth
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn authenticated(user: AuthenticatedUser) -> Json<AuthenticatedResponse> {
    Json(AuthenticatedResponse {
        username: user.username,
    })
}
