use std::sync::Arc;

use tokio::sync::broadcast;

use trade_journal::api::router::create_router;
use trade_journal::api::ws_types::WsMessage;
use trade_journal::config::{AppConfig, LogFormat};
use trade_journal::db::{self, MemoryTradeStore, PgTradeStore, TradeStore};
use trade_journal::metrics::init_metrics;
use trade_journal::price_feed::{PriceCache, PriceFeedClient};
use trade_journal::services::price_poller::run_price_poller;
use trade_journal::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = init_metrics()?;

    let store: Arc<dyn TradeStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::init_pool(url).await?;
            tracing::info!("Database connected, migrations applied");
            Arc::new(PgTradeStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, records are kept in memory only");
            Arc::new(MemoryTradeStore::new())
        }
    };

    tracing::info!(
        max_loss_pct = %config.max_loss_pct,
        must_tp_pct = %config.must_tp_pct,
        "Default risk profile loaded"
    );

    // --- WebSocket broadcast channel for journal clients ---
    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);

    // --- Price feed ---
    let prices = PriceCache::new();
    let price_feed = PriceFeedClient::new(config.price_feed_url.clone());
    {
        let client = price_feed.clone();
        let cache = prices.clone();
        let tx = ws_tx.clone();
        let symbols = config.price_symbols.clone();
        let interval_secs = config.price_poll_interval_secs;
        tokio::spawn(async move {
            run_price_poller(client, cache, tx, symbols, interval_secs).await;
        });
    }

    let state = AppState {
        store,
        config,
        prices,
        price_feed,
        ws_tx,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}
