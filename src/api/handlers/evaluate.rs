use std::time::Instant;

use axum::extract::State;
use axum::Json;
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::config::resolve_risk_profile;
use super::{ok, ApiResult};
use crate::errors::AppError;
use crate::evaluation::{evaluate, EvaluationResult, RiskProfile, TradeProposal};
use crate::models::Direction;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub total_assets: Decimal,
    pub current_price: Decimal,
    pub direction: Direction,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub win_ratio: Decimal,
    /// Overrides the configured profile for this call only.
    pub risk_profile: Option<RiskProfile>,
}

impl EvaluateRequest {
    pub fn proposal(&self) -> TradeProposal {
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

/// Resolve the profile and run the evaluator, recording metrics.
pub async fn run_evaluation(
    state: &AppState,
    proposal: &TradeProposal,
    profile_override: Option<RiskProfile>,
) -> Result<(EvaluationResult, RiskProfile), AppError> {
    let profile = resolve_risk_profile(state, profile_override).await?;

    let start = Instant::now();
    let result = evaluate(proposal, &profile);
    histogram!("evaluation_duration_seconds").record(start.elapsed().as_secs_f64());
    counter!("evaluations_total").increment(1);

    let result = result?;
    if !result.is_valid {
        counter!("evaluations_rejected_total").increment(1);
    }

    tracing::debug!(
        direction = %proposal.direction,
        current_price = %proposal.current_price,
        is_valid = result.is_valid,
        recommended_size = %result.recommended_size,
        "Proposal evaluated"
    );

    Ok((result, profile))
}

/// POST /api/evaluate: score a proposal without recording it
pub async fn evaluate_proposal(
    State(state): State<AppState>,
    Json(body): Json<EvaluateRequest>,
) -> ApiResult<EvaluationResult> {
    let (result, _) = run_evaluation(&state, &body.proposal(), body.risk_profile).await?;
    ok(result)
}
