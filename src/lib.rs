pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod evaluation;
pub mod journal;
pub mod metrics;
pub mod models;
pub mod price_feed;
pub mod services;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::db::TradeStore;
use crate::price_feed::{PriceCache, PriceFeedClient};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeStore>,
    pub config: AppConfig,
    pub prices: PriceCache,
    pub price_feed: PriceFeedClient,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
