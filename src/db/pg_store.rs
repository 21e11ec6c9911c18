use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{config_repo, trade_repo, RuntimeConfigEntry, TradeStore};
use crate::models::{ExecutionStatus, ExecutionUpdate, NewTradeRecord, TradeRecord};

/// Postgres-backed store; delegates to the repo functions.
#[derive(Debug, Clone)]
pub struct PgTradeStore {
    pool: PgPool,
}

impl PgTradeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TradeStore for PgTradeStore {
    async fn insert_trade(&self, record: NewTradeRecord) -> anyhow::Result<TradeRecord> {
        trade_repo::insert_trade(&self.pool, &record).await
    }

    async fn get_all_trades(&self) -> anyhow::Result<Vec<TradeRecord>> {
        trade_repo::get_all_trades(&self.pool).await
    }

    async fn get_trade(&self, id: Uuid) -> anyhow::Result<Option<TradeRecord>> {
        trade_repo::get_trade_by_id(&self.pool, id).await
    }

    async fn get_trades_by_trade_id(&self, trade_id: i64) -> anyhow::Result<Vec<TradeRecord>> {
        trade_repo::get_trades_by_trade_id(&self.pool, trade_id).await
    }

    async fn get_trades_by_status(
        &self,
        status: ExecutionStatus,
    ) -> anyhow::Result<Vec<TradeRecord>> {
        trade_repo::get_trades_by_status(&self.pool, status).await
    }

    async fn count_trades(&self) -> anyhow::Result<i64> {
        trade_repo::count_trades(&self.pool).await
    }

    async fn count_distinct_trade_ids(&self) -> anyhow::Result<i64> {
        trade_repo::count_distinct_trade_ids(&self.pool).await
    }

    async fn next_trade_id(&self) -> anyhow::Result<i64> {
        trade_repo::next_trade_id(&self.pool).await
    }

    async fn update_execution(
        &self,
        id: Uuid,
        update: &ExecutionUpdate,
    ) -> anyhow::Result<Option<TradeRecord>> {
        trade_repo::update_execution(&self.pool, id, update).await
    }

    async fn update_review(&self, id: Uuid, review: &str) -> anyhow::Result<Option<TradeRecord>> {
        trade_repo::update_review(&self.pool, id, review).await
    }

    async fn delete_trade(&self, id: Uuid) -> anyhow::Result<bool> {
        trade_repo::delete_trade(&self.pool, id).await
    }

    async fn get_runtime_config(&self) -> anyhow::Result<Vec<RuntimeConfigEntry>> {
        config_repo::get_all_config(&self.pool).await
    }

    async fn upsert_runtime_config(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        config_repo::upsert_config(&self.pool, entries).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
