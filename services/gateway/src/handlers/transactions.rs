use super::{ValidJson, ValidPath};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::CreateTransactionRequest;
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use settlement_engine::SettlementRequest;
use types::errors::{LedgerError, LedgerResult};
use types::transaction::{Transaction, TransactionType};

pub async fn create_transaction(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidJson(payload): ValidJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    user.ensure_owner(&payload.username)?;

    state.rate_limiter.check_rate_limit(
        &format!("{}:transactions", user.username.to_lowercase()),
        state.config.trade_limit,
    )?;

    let transaction_type: TransactionType = payload.transaction_type.parse()?;
    let receipt = state
        .ledger
        .settlement
        .execute(SettlementRequest {
            username: payload.username,
            ticker: payload.ticker,
            transaction_type,
            volume: payload.transaction_volume,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.transaction)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidPath(username): ValidPath<String>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    user.ensure_owner(&username)?;
    Ok(Json(
        state.ledger.transactions.list_transactions(&username).await?,
    ))
}

pub async fn list_transactions_in_range(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidPath((username, start, end)): ValidPath<(String, String, String)>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    user.ensure_owner(&username)?;
    let start = parse_bound(&start, Bound::Start)?;
    let end = parse_bound(&end, Bound::End)?;
    Ok(Json(
        state
            .ledger
            .transactions
            .list_transactions_in_range(&username, start, end)
            .await?,
    ))
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// RFC 3339, or a bare `YYYY-MM-DD` covering the whole UTC day
fn parse_bound(raw: &str, bound: Bound) -> LedgerResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let invalid = || {
        LedgerError::invalid(format!(
            "invalid timestamp {:?}: expected RFC 3339 or YYYY-MM-DD",
            raw
        ))
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let at = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_micro_opt(23, 59, 59, 999_999),
    };
    at.map(|naive| naive.and_utc()).ok_or_else(invalid)
}
