use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::format::{format_amount, format_fixed};
use crate::models::Direction;

/// Share of capital lost when the stop-loss is hit at full leverage.
pub const DEFAULT_MAX_LOSS_PCT: Decimal = dec!(0.02);
/// Take-profit distance, as a share of capital, that a setup should reach.
pub const DEFAULT_MUST_TP_PCT: Decimal = dec!(0.30);

/// Risk parameters the evaluator sizes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub max_loss_pct: Decimal,
    pub must_tp_pct: Decimal,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            max_loss_pct: DEFAULT_MAX_LOSS_PCT,
            must_tp_pct: DEFAULT_MUST_TP_PCT,
        }
    }
}

impl RiskProfile {
    pub fn validate(&self) -> Result<(), EvaluationError> {
        for (name, value) in [
            ("max_loss_pct", self.max_loss_pct),
            ("must_tp_pct", self.must_tp_pct),
        ] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(EvaluationError::InvalidInput(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A prospective trade as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub total_assets: Decimal,
    pub current_price: Decimal,
    pub direction: Direction,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub win_ratio: Decimal,
}

impl TradeProposal {
    fn validate(&self) -> Result<(), EvaluationError> {
        if self.current_price <= Decimal::ZERO {
            return Err(EvaluationError::InvalidInput(format!(
                "current_price must be positive, got {}",
                self.current_price
            )));
        }
        if self.total_assets < Decimal::ZERO {
            return Err(EvaluationError::InvalidInput(format!(
                "total_assets must not be negative, got {}",
                self.total_assets
            )));
        }
        if self.stop_loss_price <= Decimal::ZERO {
            return Err(EvaluationError::InvalidInput(format!(
                "stop_loss_price must be positive, got {}",
                self.stop_loss_price
            )));
        }
        if self.take_profit_price <= Decimal::ZERO {
            return Err(EvaluationError::InvalidInput(format!(
                "take_profit_price must be positive, got {}",
                self.take_profit_price
            )));
        }
        if self.win_ratio < Decimal::ZERO || self.win_ratio > Decimal::ONE {
            return Err(EvaluationError::InvalidInput(format!(
                "win_ratio must be in [0, 1], got {}",
                self.win_ratio
            )));
        }
        if self.stop_loss_price == self.current_price {
            return Err(EvaluationError::DegenerateLoss {
                price: self.current_price,
            });
        }
        Ok(())
    }
}

/// Outcome of a single evaluation.
///
/// `logs` is the human-readable trace shown to the user, one line per step.
/// The leverage and Kelly fields are `None` when the trade was rejected on ROI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub logs: Vec<String>,
    pub is_valid: bool,
    pub recommended_size: Decimal,
    pub income: Decimal,
    pub loss: Decimal,
    pub roi: Decimal,
    pub max_leverage: Option<Decimal>,
    pub max_position_size: Option<Decimal>,
    pub must_stop_loss: Option<Decimal>,
    pub must_take_profit: Option<Decimal>,
    pub kelly_fraction: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("stop-loss equals current price {price}: payoff ratio is undefined")]
    DegenerateLoss { price: Decimal },

    #[error("arithmetic overflow while sizing the position")]
    Overflow,

    /// A sizing term rounded to zero, e.g. a tiny `max_loss_pct` against a
    /// wide stop leaves no usable leverage.
    #[error("sizing term rounded to zero; max_loss_pct is too small for this stop distance")]
    ZeroDivisor,
}

fn div(num: Decimal, den: Decimal) -> Result<Decimal, EvaluationError> {
    if den.is_zero() {
        return Err(EvaluationError::ZeroDivisor);
    }
    num.checked_div(den).ok_or(EvaluationError::Overflow)
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, EvaluationError> {
    a.checked_mul(b).ok_or(EvaluationError::Overflow)
}

/// Score a proposal and size it with the Kelly criterion under a leverage cap.
///
/// The leverage cap is the multiplier at which hitting the stop-loss costs
/// exactly `max_loss_pct` of capital; the Kelly fraction then scales the
/// capped position.
pub fn evaluate(
    proposal: &TradeProposal,
    profile: &RiskProfile,
) -> Result<EvaluationResult, EvaluationError> {
    profile.validate()?;
    proposal.validate()?;

    let price = proposal.current_price;
    let w = proposal.win_ratio;
    let q = Decimal::ONE - w;

    // 1-3. Reward and risk per unit of price, expected return.
    let income = div((proposal.take_profit_price - price).abs(), price)?;
    let loss = div((proposal.stop_loss_price - price).abs(), price)?;
    let roi = w * income - q * loss;

    let mut logs = vec![
        format!("Income: {}", format_fixed(income, 4)),
        format!("Loss: {}", format_fixed(loss, 4)),
        format!("ROI: {}", format_fixed(roi, 4)),
    ];

    if roi < Decimal::ZERO {
        logs.push("Not a good trade".to_string());
        return Ok(EvaluationResult {
            logs,
            is_valid: false,
            recommended_size: Decimal::ZERO,
            income,
            loss,
            roi,
            max_leverage: None,
            max_position_size: None,
            must_stop_loss: None,
            must_take_profit: None,
            kelly_fraction: None,
        });
    }

    // 6-9. Leverage cap.
    let loss_ratio = div((price - proposal.stop_loss_price).abs(), price)?;
    let max_leverage = div(profile.max_loss_pct, loss_ratio)?;
    let max_position_size = mul(proposal.total_assets, max_leverage)?;

    logs.push(format!("Max Leverage: {}", format_amount(max_leverage, 2)));
    logs.push(format!(
        "Max Position Size: {}",
        format_amount(max_position_size, 2)
    ));

    // 10. Price levels implied by the profile at the capped leverage.
    let sl_offset = div(profile.max_loss_pct, max_leverage)?;
    let tp_offset = div(profile.must_tp_pct, max_leverage)?;
    let (must_stop_loss, must_take_profit, label) = match proposal.direction {
        Direction::Long => (
            mul(Decimal::ONE - sl_offset, price)?,
            mul(Decimal::ONE + tp_offset, price)?,
            "Long",
        ),
        Direction::Short => (
            mul(Decimal::ONE + sl_offset, price)?,
            mul(Decimal::ONE - tp_offset, price)?,
            "Short",
        ),
    };
    logs.push(format!(
        "Must SL Price ({label}): {}",
        format_amount(must_stop_loss, 2)
    ));
    logs.push(format!(
        "Must TP Price ({label}): {}",
        format_amount(must_take_profit, 2)
    ));

    // 11. Kelly fraction f = w - q / b with payoff ratio b = income / loss.
    // With q = 0 the penalty term vanishes even when b is zero.
    let kelly = if q.is_zero() {
        w
    } else {
        let b = div(income, loss)?;
        w - div(q, b)?
    };

    // 12-13.
    let recommended_size = if kelly > Decimal::ZERO {
        mul(mul(proposal.total_assets, max_leverage)?, kelly)?
    } else {
        Decimal::ZERO
    };

    logs.push(format!(
        "Kelly Factor: {}%",
        format_fixed(kelly * Decimal::ONE_HUNDRED, 2)
    ));
    let size_line = if kelly > Decimal::ZERO {
        format_amount(recommended_size, 2)
    } else {
        "0 (not a profitable edge)".to_string()
    };
    logs.push(format!("Kelly-Adjusted Position Size: {size_line}"));

    Ok(EvaluationResult {
        logs,
        is_valid: true,
        recommended_size,
        income,
        loss,
        roi,
        max_leverage: Some(max_leverage),
        max_position_size: Some(max_position_size),
        must_stop_loss: Some(must_stop_loss),
        must_take_profit: Some(must_take_profit),
        kelly_fraction: Some(kelly),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
