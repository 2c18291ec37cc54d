//! Gateway Service
//!
//! The HTTP surface of the trading ledger. Handlers authenticate the
//! caller, rate-limit logins and trades, and delegate to the settlement
//! engine's services over a shared store.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use config::GatewayConfig;
pub use router::create_router;
pub use state::AppState;
