use crate::handlers::{access, health, stocks, transactions, users};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let ledger_routes = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/{username}", get(users::get_user))
        .route("/stocks", get(stocks::list_stocks).post(stocks::create_stock))
        .route("/stocks/{ticker}", get(stocks::get_stock))
        .route("/transactions", post(transactions::create_transaction))
        .route("/transactions/{username}", get(transactions::list_transactions))
        .route(
            "/transactions/{username}/{start}/{end}",
            get(transactions::list_transactions_in_range),
        );

    let access_routes = Router::new()
        .route("/user/register", post(access::register))
        .route("/user/login", post(access::login))
        .route("/user/authenticated", get(access::authenticated));

    Router::new()
        .merge(ledger_routes)
        .merge(access_routes)
        .route("/health", get(health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
