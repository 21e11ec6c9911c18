use metrics::counter;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::api::ws_types::WsMessage;
use crate::price_feed::{PriceCache, PriceFeedClient};

/// Run the price poller loop. Every `interval_secs` it refreshes each
/// configured symbol into the shared cache and broadcasts the new tick.
/// Fetch failures are logged and counted; the loop never exits on them.
pub async fn run_price_poller(
    client: PriceFeedClient,
    cache: PriceCache,
    ws_tx: broadcast::Sender<WsMessage>,
    symbols: Vec<String>,
    interval_secs: u64,
) {
    if interval_secs == 0 || symbols.is_empty() {
        tracing::info!("Price poller disabled");
        return;
    }

    tracing::info!(
        symbols = ?symbols,
        interval_secs,
        "Price poller started"
    );

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let updated = poll_once(&client, &cache, &ws_tx, &symbols).await;
        tracing::debug!(updated, total = symbols.len(), "Price poll complete");
    }
}

/// One pass over `symbols`. Returns how many were refreshed.
pub async fn poll_once(
    client: &PriceFeedClient,
    cache: &PriceCache,
    ws_tx: &broadcast::Sender<WsMessage>,
    symbols: &[String],
) -> usize {
    let mut updated = 0;

    for symbol in symbols {
        match client.get_price(symbol).await {
            Ok(tick) => {
                cache.update(tick.clone()).await;
                // No subscribers is fine
                let _ = ws_tx.send(WsMessage::PriceUpdate(tick));
                updated += 1;
            }
            Err(e) => {
                counter!("price_fetch_failures_total").increment(1);
                tracing::warn!(error = %e, symbol = %symbol, "Failed to fetch price");
            }
        }
    }

    updated
}
