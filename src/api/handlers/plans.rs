use axum::extract::State;
use axum::Json;
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::evaluate::run_evaluation;
use super::{ok, ApiResult};
use crate::api::ws_types::WsMessage;
use crate::errors::AppError;
use crate::evaluation::{EvaluationResult, RiskProfile, TradeProposal};
use crate::metrics::refresh_ongoing_gauge;
use crate::models::{
    Direction, ExecutionStatus, NewTradeRecord, TradeExecution, TradePlan, TradeRecord,
};
use crate::price_feed::binance::normalize_symbol;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub symbol: String,
    pub total_assets: Decimal,
    pub current_price: Decimal,
    pub direction: Direction,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub win_ratio: Decimal,
    pub risk_profile: Option<RiskProfile>,
}

impl CreatePlanRequest {
    fn proposal(&self) -> TradeProposal {
        TradeProposal {
            total_assets: self.total_assets,
            current_price: self.current_price,
            direction: self.direction,
            stop_loss_price: self.stop_loss_price,
            take_profit_price: self.take_profit_price,
            win_ratio: self.win_ratio,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub evaluation: EvaluationResult,
    pub record: TradeRecord,
}

/// POST /api/plans: evaluate a proposal and record it as an ongoing trade.
/// Any valid evaluation is recorded, including a zero Kelly size.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePlanRequest>,
) -> ApiResult<PlanResponse> {
    let symbol = normalize_symbol(&body.symbol)?;
    let proposal = body.proposal();
    let (evaluation, profile) = run_evaluation(&state, &proposal, body.risk_profile).await?;

    if !evaluation.is_valid {
        return Err(AppError::Unprocessable(format!(
            "trade rejected: {}",
            evaluation.logs.join("; ")
        )));
    }

    let now = Utc::now();
    let size = evaluation.recommended_size;
    let record = NewTradeRecord {
        trade_id: None,
        symbol,
        total_assets: proposal.total_assets,
        plan: Some(TradePlan {
            current_price: proposal.current_price,
            direction: proposal.direction,
            stop_loss_price: proposal.stop_loss_price,
            take_profit_price: proposal.take_profit_price,
            win_ratio: proposal.win_ratio,
            max_loss_pct: profile.max_loss_pct,
            position_size: size,
            started_at: now,
        }),
        execution: TradeExecution {
            status: ExecutionStatus::Ongoing,
            direction: proposal.direction,
            position_size: Some(size),
            enter_price: Some(proposal.current_price),
            exit_price: Some(proposal.take_profit_price),
            pnl: Some(Decimal::ZERO),
            started_at: Some(now),
            ended_at: None,
        },
        review: None,
    };

    let record = state.store.insert_trade(record).await?;
    counter!("plans_accepted_total").increment(1);
    counter!("trade_records_written_total").increment(1);

    tracing::info!(
        trade_id = record.trade_id,
        symbol = %record.symbol,
        direction = %record.execution.direction,
        size = %size,
        "Plan accepted"
    );
    let _ = state.ws_tx.send(WsMessage::TradeCreated(record.clone()));
    refresh_ongoing_gauge(state.store.as_ref()).await;

    ok(PlanResponse { evaluation, record })
}
