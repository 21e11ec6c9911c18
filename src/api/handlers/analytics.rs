use axum::extract::State;
use metrics::gauge;

use super::{ok, ApiResult};
use crate::journal::JournalSummary;
use crate::AppState;

/// GET /api/analytics/summary
pub async fn summary(State(state): State<AppState>) -> ApiResult<JournalSummary> {
    let records = state.store.get_all_trades().await?;
    let summary = JournalSummary::from_records(&records);

    gauge!("ongoing_trades").set(summary.ongoing as f64);

    ok(summary)
}
