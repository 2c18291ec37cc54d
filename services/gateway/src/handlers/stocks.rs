use super::{ValidJson, ValidPath};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{CreateStockRequest, CreatedResponse};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use types::stock::Stock;

pub async fn create_stock(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    ValidJson(payload): ValidJson<CreateStockRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let id = state
        .ledger
        .catalog
        .create_stock(&payload.ticker, payload.price)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id: id.to_string() }),
    ))
}

pub async fn list_stocks(State(state): State<AppState>) -> Result<Json<Vec<Stock>>, AppError> {
    Ok(Json(state.ledger.catalog.list_stocks().await?))
}

pub async fn get_stock(
    State(state): State<AppState>,
    ValidPath(ticker): ValidPath<String>,
) -> Result<Json<Stock>, AppError> {
    Ok(Json(state.ledger.catalog.get_stock(&ticker).await?))
}
