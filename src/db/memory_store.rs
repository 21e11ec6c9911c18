use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RuntimeConfigEntry, TradeStore};
use crate::models::{ExecutionStatus, ExecutionUpdate, NewTradeRecord, TradeRecord};

/// Process-local store used when no database is configured, and in tests.
/// Records are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryTradeStore {
    records: RwLock<Vec<TradeRecord>>,
    config: RwLock<HashMap<String, String>>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn history_order(a: &TradeRecord, b: &TradeRecord) -> Ordering {
    let by_plan = match (a.plan_started_at(), b.plan_started_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_plan.then_with(|| b.created_at.cmp(&a.created_at))
}

/// Newest-first listing; equal keys keep the later insert first.
fn sorted_history<'a>(records: impl DoubleEndedIterator<Item = &'a TradeRecord>) -> Vec<TradeRecord> {
    let mut out: Vec<TradeRecord> = records.rev().cloned().collect();
    out.sort_by(history_order);
    out
}

fn next_id(records: &[TradeRecord]) -> i64 {
    records.iter().map(|r| r.trade_id).max().unwrap_or(0) + 1
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn insert_trade(&self, record: NewTradeRecord) -> anyhow::Result<TradeRecord> {
        let mut records = self.records.write().await;
        let trade_id = record.trade_id.unwrap_or_else(|| next_id(&records));

        let stored = TradeRecord {
            id: Uuid::new_v4(),
            trade_id,
            symbol: record.symbol,
            total_assets: record.total_assets,
            plan: record.plan,
            execution: record.execution,
            review: record.review,
            created_at: Utc::now(),
        };
        records.push(stored.clone());

        Ok(stored)
    }

    async fn get_all_trades(&self) -> anyhow::Result<Vec<TradeRecord>> {
        let records = self.records.read().await;
        Ok(sorted_history(records.iter()))
    }

    async fn get_trade(&self, id: Uuid) -> anyhow::Result<Option<TradeRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn get_trades_by_trade_id(&self, trade_id: i64) -> anyhow::Result<Vec<TradeRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.trade_id == trade_id)
            .cloned()
            .collect())
    }

    async fn get_trades_by_status(
        &self,
        status: ExecutionStatus,
    ) -> anyhow::Result<Vec<TradeRecord>> {
        let records = self.records.read().await;
        Ok(sorted_history(
            records.iter().filter(|r| r.execution.status == status),
        ))
    }

    async fn count_trades(&self) -> anyhow::Result<i64> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn count_distinct_trade_ids(&self) -> anyhow::Result<i64> {
        let records = self.records.read().await;
        let mut ids: Vec<i64> = records.iter().map(|r| r.trade_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids.len() as i64)
    }

    async fn next_trade_id(&self) -> anyhow::Result<i64> {
        Ok(next_id(&self.records.read().await))
    }

    async fn update_execution(
        &self,
        id: Uuid,
        update: &ExecutionUpdate,
    ) -> anyhow::Result<Option<TradeRecord>> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|r| {
            r.execution.apply(update);
            r.clone()
        }))
    }

    async fn update_review(&self, id: Uuid, review: &str) -> anyhow::Result<Option<TradeRecord>> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|r| {
            r.review = Some(review.to_string());
            r.clone()
        }))
    }

    async fn delete_trade(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn get_runtime_config(&self) -> anyhow::Result<Vec<RuntimeConfigEntry>> {
        let config = self.config.read().await;
        let mut entries: Vec<RuntimeConfigEntry> = config
            .iter()
            .map(|(key, value)| RuntimeConfigEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn upsert_runtime_config(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        let mut config = self.config.write().await;
        for (key, value) in entries {
            config.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
