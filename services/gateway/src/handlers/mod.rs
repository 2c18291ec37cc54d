pub mod access;
pub mod health;
pub mod stocks;
pub mod transactions;
pub mod users;

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// `Json` whose rejections are reported as `INVALID_INPUT`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ValidJson<T>(pub T);

/// `Path` whose rejections are reported as `INVALID_INPUT`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidPath<T>(pub T);
