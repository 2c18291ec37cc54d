use super::{ValidJson, ValidPath};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{CreateUserRequest, CreatedResponse};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use types::account::Account;

pub async fn create_user(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state
        .ledger
        .accounts
        .create_account(&payload.username, payload.initial_balance)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_string() }),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidPath(username): ValidPath<String>,
) -> Result<Json<Account>, AppError> {
    user.ensure_owner(&username)?;
    let account = state.ledger.accounts.get_account(&username).await?;
    Ok(Json(account))
}
