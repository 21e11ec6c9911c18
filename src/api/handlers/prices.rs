use axum::extract::{Path, State};
use metrics::counter;

use super::{ok, ApiResult};
use crate::price_feed::binance::normalize_symbol;
use crate::price_feed::PriceTick;
use crate::AppState;

/// GET /api/prices: every cached tick
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PriceTick>> {
    ok(state.prices.snapshot().await)
}

/// GET /api/prices/:symbol: cached tick, or a live fetch on a miss
pub async fn latest(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<PriceTick> {
    let symbol = normalize_symbol(&symbol)?;

    if let Some(tick) = state.prices.get(&symbol).await {
        return ok(tick);
    }

    let tick = state.price_feed.get_price(&symbol).await.inspect_err(|e| {
        counter!("price_fetch_failures_total").increment(1);
        tracing::warn!(error = %e, symbol = %symbol, "Live price fetch failed");
    })?;
    state.prices.update(tick.clone()).await;

    ok(tick)
}
