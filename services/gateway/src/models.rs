use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStockRequest {
    pub ticker: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    pub username: String,
    pub ticker: String,
    /// `BUY` or `SELL`, any case
    pub transaction_type: String,
    pub transaction_volume: i64,
}

/// Body of a 201 for newly created users and stocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedResponse {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
