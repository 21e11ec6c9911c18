use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::db::TradeStore;
use crate::models::ExecutionStatus;

/// Install the Prometheus exporter as the global recorder and register the
/// journal metrics. `render()` on the returned handle produces the scrape
/// payload served on `/metrics`.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(handle)
}

/// Pre-register so every series shows up before its first update.
pub fn register_metrics() {
    counter!("evaluations_total").absolute(0);
    counter!("evaluations_rejected_total").absolute(0);
    counter!("plans_accepted_total").absolute(0);
    counter!("trade_records_written_total").absolute(0);
    counter!("price_fetch_failures_total").absolute(0);

    gauge!("ongoing_trades").set(0.0);

    histogram!("evaluation_duration_seconds").record(0.0);
}

/// Recount ongoing records and publish them on the `ongoing_trades` gauge.
/// Store errors are logged and leave the gauge unchanged.
pub async fn refresh_ongoing_gauge(store: &dyn TradeStore) -> Option<usize> {
    match store.get_trades_by_status(ExecutionStatus::Ongoing).await {
        Ok(records) => {
            gauge!("ongoing_trades").set(records.len() as f64);
            Some(records.len())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to refresh ongoing_trades gauge");
            None
        }
    }
}
