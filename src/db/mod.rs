pub mod config_repo;
pub mod memory_store;
pub mod pg_store;
pub mod trade_repo;

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ExecutionStatus, ExecutionUpdate, NewTradeRecord, TradeRecord};

pub use config_repo::RuntimeConfigEntry;
pub use memory_store::MemoryTradeStore;
pub use pg_store::PgTradeStore;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Persistence for journal records and runtime settings.
///
/// Listings follow the history view order: newest plan first, records
/// without a plan last, ties broken by newest `created_at`. Records of one
/// trade id are returned oldest first.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn insert_trade(&self, record: NewTradeRecord) -> anyhow::Result<TradeRecord>;

    async fn get_all_trades(&self) -> anyhow::Result<Vec<TradeRecord>>;

    async fn get_trade(&self, id: Uuid) -> anyhow::Result<Option<TradeRecord>>;

    async fn get_trades_by_trade_id(&self, trade_id: i64) -> anyhow::Result<Vec<TradeRecord>>;

    async fn get_trades_by_status(
        &self,
        status: ExecutionStatus,
    ) -> anyhow::Result<Vec<TradeRecord>>;

    async fn count_trades(&self) -> anyhow::Result<i64>;

    async fn count_distinct_trade_ids(&self) -> anyhow::Result<i64>;

    /// `max(trade_id) + 1`, or 1 for an empty journal.
    async fn next_trade_id(&self) -> anyhow::Result<i64>;

    async fn update_execution(
        &self,
        id: Uuid,
        update: &ExecutionUpdate,
    ) -> anyhow::Result<Option<TradeRecord>>;

    async fn update_review(&self, id: Uuid, review: &str) -> anyhow::Result<Option<TradeRecord>>;

    async fn delete_trade(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn get_runtime_config(&self) -> anyhow::Result<Vec<RuntimeConfigEntry>>;

    async fn upsert_runtime_config(&self, entries: &HashMap<String, String>) -> anyhow::Result<()>;

    async fn ping(&self) -> anyhow::Result<()>;
}
