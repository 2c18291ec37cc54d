//! `stocks` table

use crate::error::StoreResult;
use crate::rows::StockRow;
use crate::store::LedgerStore;
use sqlx::SqlitePool;
use types::stock::Stock;

impl LedgerStore {
    /// Insert a new stock. A taken ticker surfaces as `UniqueViolation`.
    pub async fn insert_stock(&self, stock: &Stock) -> StoreResult<()> {
        let pool = self.pool();
        self.guarded("insert_stock", || insert_stock(pool, stock)).await
    }

    /// Exact-match lookup by ticker
    pub async fn find_stock(&self, ticker: &str) -> StoreResult<Option<Stock>> {
        let pool = self.pool();
        self.guarded("find_stock", || find_stock(pool, ticker)).await
    }

    /// Every stock, ordered by ticker
    pub async fn list_stocks(&self) -> StoreResult<Vec<Stock>> {
        let pool = self.pool();
        self.guarded("list_stocks", || list_stocks(pool)).await
    }
}

async fn insert_stock(pool: &SqlitePool, stock: &Stock) -> StoreResult<()> {
    sqlx::query("INSERT INTO stocks (id, ticker, price) VALUES (?, ?, ?)")
        .bind(stock.id.to_string())
        .bind(&stock.ticker)
        .bind(stock.price.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

async fn find_stock(pool: &SqlitePool, ticker: &str) -> StoreResult<Option<Stock>> {
    let row = sqlx::query_as::<_, StockRow>("SELECT id, ticker, price FROM stocks WHERE ticker = ?")
        .bind(ticker)
        .fetch_optional(pool)
        .await?;
    row.map(Stock::try_from).transpose()
}

async fn list_stocks(pool: &SqlitePool) -> StoreResult<Vec<Stock>> {
    let rows = sqlx::query_as::<_, StockRow>("SELECT id, ticker, price FROM stocks ORDER BY ticker")
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(Stock::try_from).collect()
}
