use crate::auth::{AuthService, JwtKeys};
use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;
use persistence::{LedgerStore, StoreResult};
use settlement_engine::Ledger;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub auth: Arc<AuthService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(store: Arc<LedgerStore>, config: GatewayConfig) -> Self {
        let keys = JwtKeys::new(config.jwt_secret.as_bytes(), config.token_ttl);
        Self {
            ledger: Ledger::new(Arc::clone(&store)),
            auth: Arc::new(AuthService::new(store, keys, config.bcrypt_cost)),
            rate_limiter: Arc::new(RateLimiter::new()),
            config: Arc::new(config),
        }
    }

    /// Open the configured database and build the shared state over it
    pub async fn connect(config: GatewayConfig) -> StoreResult<Self> {
        let store = LedgerStore::connect(config.store_config()).await?;
        Ok(Self::new(Arc::new(store), config))
    }
}
