use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::PriceTick;

/// Latest observed price per symbol, shared between the poller and the API.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    inner: Arc<RwLock<HashMap<String, PriceTick>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, symbol: &str) -> Option<PriceTick> {
        self.inner.read().await.get(symbol).cloned()
    }

    /// Store a tick unless a newer one is already cached.
    pub async fn update(&self, tick: PriceTick) {
        let mut map = self.inner.write().await;
        match map.get(&tick.symbol) {
            Some(existing) if existing.fetched_at > tick.fetched_at => {}
            _ => {
                map.insert(tick.symbol.clone(), tick);
            }
        }
    }

    pub async fn snapshot(&self) -> Vec<PriceTick> {
        let mut ticks: Vec<PriceTick> = self.inner.read().await.values().cloned().collect();
        ticks.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        ticks
    }
}
