//! End-to-end tests driving the router in-process

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use gateway::config::RateLimit;
use gateway::{AppState, GatewayConfig, create_router};
use persistence::{LedgerStore, StoreConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_config(GatewayConfig::default()).await
    }

    async fn with_config(mut config: GatewayConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        config.database_url = format!("sqlite://{}", dir.path().join("api.db").display());
        config.jwt_secret = "api-test-secret".to_string();
        config.bcrypt_cost = 4;
        let store = LedgerStore::connect(StoreConfig::new(config.database_url.clone()))
            .await
            .unwrap();
        let state = AppState::new(Arc::new(store), config);
        Self {
            _dir: dir,
            router: create_router(state),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };
        self.send_request(builder.body(body).unwrap()).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/user/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "correct horse",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Registered login plus a funded trading account and the AAPL listing
    async fn trader(&self, username: &str, balance: &str) -> String {
        let token = self.register(username).await;
        let (status, _) = self
            .post(
                "/users",
                Some(&token),
                json!({"username": username, "initial_balance": balance}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        token
    }

    async fn list_aapl(&self, token: &str) {
        let (status, _) = self
            .post("/stocks", Some(token), json!({"ticker": "AAPL", "price": "150.25"}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn trade(&self, token: &str, username: &str, side: &str, volume: i64) -> (StatusCode, Value) {
        self.post(
            "/transactions",
            Some(token),
            json!({
                "username": username,
                "ticker": "AAPL",
                "transaction_type": side,
                "transaction_volume": volume,
            }),
        )
        .await
    }
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_whoami() {
    let app = TestApp::new().await;
    let token = app.register("alice").await;

    let (status, body) = app.get("/user/authenticated", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (status, body) = app
        .post(
            "/user/login",
            None,
            json!({"username": "ALICE", "password": "correct horse"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["token"].as_str().unwrap().to_string();
    let (_, body) = app.get("/user/authenticated", Some(&login_token)).await;
    assert_eq!(body["username"], "alice");

    let (status, body) = app
        .post(
            "/user/login",
            None,
            json!({"username": "alice", "password": "wrong"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app
        .post(
            "/user/login",
            None,
            json!({"username": "nobody", "password": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_fields() {
    let app = TestApp::new().await;
    app.register("alice").await;

    let (status, body) = app
        .post(
            "/user/register",
            None,
            json!({"username": "Alice", "email": "a@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");

    let (status, _) = app
        .post(
            "/user/register",
            None,
            json!({"username": "bob", "email": "not-an-email", "password": "pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/user/register",
            None,
            json!({"username": "bob", "email": "bob@example.com", "password": ""}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/user/register",
            None,
            json!({"username": "bob", "email": "bob@example.com", "password": "x".repeat(73)}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/users", None, json!({"username": "x", "initial_balance": "1"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app.get("/user/authenticated", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/transactions/alice", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/user/authenticated")
        .header(header::AUTHORIZATION, "Basic YWxpY2U6cHc=")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send_request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_trading_scenario() {
    let app = TestApp::new().await;
    let token = app.trader("alice", "1000.00").await;
    app.list_aapl(&token).await;

    let (status, body) = app.trade(&token, "alice", "BUY", 4).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["transaction_type"], "BUY");
    assert_eq!(body["transaction_volume"], 4);
    assert_eq!(body["ticker"], "AAPL");
    assert_eq!(decimal(&body["transaction_price"]), dec!(601.00));

    let (status, user) = app.get("/users/alice", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&user["balance"]), dec!(399.00));

    let (status, body) = app.trade(&token, "alice", "BUY", 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INSUFFICIENT_FUNDS");

    let (_, user) = app.get("/users/alice", Some(&token)).await;
    assert_eq!(decimal(&user["balance"]), dec!(399.00));
    let (status, history) = app.get("/transactions/alice", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (status, _) = app.trade(&token, "alice", "sell", 2).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, user) = app.get("/users/alice", Some(&token)).await;
    assert_eq!(decimal(&user["balance"]), dec!(699.50));

    let (_, history) = app.get("/transactions/alice", Some(&token)).await;
    let sides: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["transaction_type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(sides, ["SELL", "BUY"]);
}

#[tokio::test]
async fn test_transaction_validation_errors() {
    let app = TestApp::new().await;
    let token = app.trader("alice", "1000").await;
    app.list_aapl(&token).await;

    let (status, body) = app.trade(&token, "alice", "HOLD", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, _) = app.trade(&token, "alice", "BUY", 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/transactions",
            Some(&token),
            json!({"username": "alice", "ticker": "TSLA", "transaction_type": "BUY", "transaction_volume": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/transactions")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": \"alice\""))
        .unwrap();
    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_trading_for_another_user_account_is_unauthorized() {
    let app = TestApp::new().await;
    let alice = app.trader("alice", "1000").await;
    let bob = app.trader("bob", "1000").await;
    app.list_aapl(&alice).await;

    let (status, _) = app.trade(&bob, "alice", "BUY", 1).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/transactions/alice", Some(&bob)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/users/alice", Some(&bob)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, user) = app.get("/users/alice", Some(&alice)).await;
    assert_eq!(decimal(&user["balance"]), dec!(1000));
}

#[tokio::test]
async fn test_transaction_range_queries() {
    let app = TestApp::new().await;
    let token = app.trader("alice", "1000").await;
    app.list_aapl(&token).await;
    app.trade(&token, "alice", "BUY", 1).await;

    let today = Utc::now().date_naive();
    let yesterday = (today - Duration::days(1)).format("%Y-%m-%d");
    let tomorrow = (today + Duration::days(1)).format("%Y-%m-%d");

    let (status, body) = app
        .get(
            &format!("/transactions/alice/{}/{}", yesterday, tomorrow),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = app
        .get("/transactions/alice/2000-01-01/2000-01-02", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .get(
            &format!("/transactions/alice/{}/{}", tomorrow, yesterday),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get("/transactions/alice/last-week/today", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_stock_catalog_routes() {
    let app = TestApp::new().await;
    let token = app.register("admin").await;

    let (status, body) = app.get("/stocks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    app.post("/stocks", Some(&token), json!({"ticker": "MSFT", "price": "410.10"}))
        .await;
    app.list_aapl(&token).await;

    let (status, _) = app
        .post("/stocks", Some(&token), json!({"ticker": "AAPL", "price": "1"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post("/stocks", Some(&token), json!({"ticker": "NFLX", "price": "0"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/stocks", None).await;
    let tickers: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["ticker"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(tickers, ["AAPL", "MSFT"]);

    let (status, body) = app.get("/stocks/MSFT", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["price"]), dec!(410.10));

    let (status, _) = app.get("/stocks/NFLX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_routes() {
    let app = TestApp::new().await;
    let token = app.trader("alice", "50").await;

    let (status, _) = app
        .post(
            "/users",
            Some(&token),
            json!({"username": "alice", "initial_balance": "10"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/users",
            Some(&token),
            json!({"username": "carol", "initial_balance": "-1"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let other = app.register("dave").await;
    let (status, body) = app.get("/users/dave", Some(&other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let mut config = GatewayConfig::default();
    config.login_limit = RateLimit {
        capacity: 2,
        refill_per_sec: 0.0,
    };
    let app = TestApp::with_config(config).await;
    app.register("alice").await;

    let attempt = json!({"username": "alice", "password": "wrong"});
    for _ in 0..2 {
        let (status, _) = app.post("/user/login", None, attempt.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = app.post("/user/login", None, attempt).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
}
