use crate::error::AppError;
use crate::models::HealthResponse;
use crate::state::AppState;
use axum::{Json, extract::State};
use types::errors::LedgerError;

/// Liveness plus a round trip to the store
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state
        .ledger
        .store()
        .ping()
        .await
        .map_err(LedgerError::from)?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
