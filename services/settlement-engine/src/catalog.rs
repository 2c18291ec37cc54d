//! Catalog Service

use persistence::{LedgerStore, StoreError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use types::errors::{LedgerError, LedgerResult};
use types::ids::StockId;
use types::numeric::Price;
use types::stock::{normalize_ticker, Stock};

#[derive(Debug, Clone)]
pub struct CatalogService {
    store: Arc<LedgerStore>,
}

impl CatalogService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn create_stock(&self, ticker: &str, price: Decimal) -> LedgerResult<StockId> {
        let ticker = normalize_ticker(ticker)?;
        let price = Price::new(price)?;
        let stock = Stock::new(ticker, price);

        match self.store.insert_stock(&stock).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => {
                return Err(LedgerError::Conflict(format!(
                    "stock {} already exists",
                    stock.ticker
                )));
            }
            Err(err) => return Err(err.into()),
        }

        info!(stock_id = %stock.id, ticker = %stock.ticker, price = %price, "Stock listed");
        Ok(stock.id)
    }

    pub async fn get_stock(&self, ticker: &str) -> LedgerResult<Stock> {
        let ticker = normalize_ticker(ticker)?;
        self.store
            .find_stock(&ticker)
            .await?
            .ok_or_else(|| LedgerError::stock_not_found(ticker))
    }

    /// All stocks, sorted by ticker
    pub async fn list_stocks(&self) -> LedgerResult<Vec<Stock>> {
        Ok(self.store.list_stocks().await?)
    }
}
