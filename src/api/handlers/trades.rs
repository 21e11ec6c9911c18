use axum::extract::{Path, Query, State};
use axum::Json;
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ok, ApiResult};
use crate::api::ws_types::WsMessage;
use crate::errors::AppError;
use crate::journal::review_or_template;
use crate::metrics::refresh_ongoing_gauge;
use crate::models::{ExecutionStatus, ExecutionUpdate, NewTradeRecord, TradeRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub status: Option<String>,
    pub trade_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TradeCounts {
    pub total: i64,
    pub distinct_trades: i64,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: String,
    pub is_template: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub review: String,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("trade record {id} not found"))
}

/// GET /api/trades: list records, optionally by trade id or by status
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TradesQuery>,
) -> ApiResult<Vec<TradeRecord>> {
    if query.trade_id.is_some() && query.status.is_some() {
        return Err(AppError::BadRequest(
            "filter by either trade_id or status, not both".into(),
        ));
    }

    let records = if let Some(trade_id) = query.trade_id {
        state.store.get_trades_by_trade_id(trade_id).await?
    } else if let Some(raw) = query.status.as_deref() {
        let status: ExecutionStatus = raw.parse().map_err(AppError::BadRequest)?;
        state.store.get_trades_by_status(status).await?
    } else {
        state.store.get_all_trades().await?
    };

    ok(records)
}

/// GET /api/trades/count
pub async fn count(State(state): State<AppState>) -> ApiResult<TradeCounts> {
    ok(TradeCounts {
        total: state.store.count_trades().await?,
        distinct_trades: state.store.count_distinct_trade_ids().await?,
    })
}

/// GET /api/trades/:id
pub async fn detail(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<TradeRecord> {
    let record = state.store.get_trade(id).await?.ok_or_else(|| not_found(id))?;
    ok(record)
}

/// PUT /api/trades/:id/execution: patch execution fields
pub async fn update_execution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ExecutionUpdate>,
) -> ApiResult<TradeRecord> {
    if update.is_empty() {
        return Err(AppError::BadRequest("no execution fields provided".into()));
    }

    let record = state
        .store
        .update_execution(id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;
    counter!("trade_records_written_total").increment(1);

    tracing::info!(
        id = %record.id,
        trade_id = record.trade_id,
        status = %record.execution.status,
        "Execution updated"
    );
    let _ = state.ws_tx.send(WsMessage::TradeUpdated(record.clone()));
    refresh_ongoing_gauge(state.store.as_ref()).await;

    ok(record)
}

/// GET /api/trades/:id/review: saved review, or the blank template
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReviewResponse> {
    let record = state.store.get_trade(id).await?.ok_or_else(|| not_found(id))?;
    let (text, is_template) = review_or_template(&record);
    ok(ReviewResponse {
        review: text.to_string(),
        is_template,
    })
}

/// PUT /api/trades/:id/review
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewRequest>,
) -> ApiResult<TradeRecord> {
    let record = state
        .store
        .update_review(id, &body.review)
        .await?
        .ok_or_else(|| not_found(id))?;
    counter!("trade_records_written_total").increment(1);

    let _ = state.ws_tx.send(WsMessage::TradeUpdated(record.clone()));
    ok(record)
}

/// POST /api/trades/:id/executions: add a further execution under the
/// same trade id, starting from a copy of this record's execution
pub async fn add_execution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ExecutionUpdate>,
) -> ApiResult<TradeRecord> {
    let source = state.store.get_trade(id).await?.ok_or_else(|| not_found(id))?;

    let mut follow_up = NewTradeRecord::follow_up(&source);
    follow_up.execution.apply(&update);

    let record = state.store.insert_trade(follow_up).await?;
    counter!("trade_records_written_total").increment(1);

    tracing::info!(
        id = %record.id,
        trade_id = record.trade_id,
        "Execution added"
    );
    let _ = state.ws_tx.send(WsMessage::TradeCreated(record.clone()));
    refresh_ongoing_gauge(state.store.as_ref()).await;

    ok(record)
}

/// DELETE /api/trades/:id
pub async fn remove(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    if !state.store.delete_trade(id).await? {
        return Err(not_found(id));
    }

    tracing::info!(id = %id, "Trade record deleted");
    let _ = state.ws_tx.send(WsMessage::TradeDeleted { id });
    refresh_ongoing_gauge(state.store.as_ref()).await;

    ok(id)
}
