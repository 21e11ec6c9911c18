use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Direction, ExecutionStatus};

/// The plan captured when an evaluated proposal was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub current_price: Decimal,
    pub direction: Direction,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub win_ratio: Decimal,
    pub max_loss_pct: Decimal,
    pub position_size: Decimal,
    pub started_at: DateTime<Utc>,
}

impl TradePlan {
    /// Loss in quote currency if the stop-loss is hit with the planned size.
    pub fn max_loss_amount(&self) -> Decimal {
        if self.current_price.is_zero() {
            return Decimal::ZERO;
        }
        let move_against = match self.direction {
            Direction::Long => self.current_price - self.stop_loss_price,
            Direction::Short => self.stop_loss_price - self.current_price,
        };
        move_against * self.position_size / self.current_price
    }

    /// Profit in quote currency if the take-profit is hit with the planned size.
    pub fn target_profit_amount(&self) -> Decimal {
        if self.current_price.is_zero() {
            return Decimal::ZERO;
        }
        let move_with = match self.direction {
            Direction::Long => self.take_profit_price - self.current_price,
            Direction::Short => self.current_price - self.take_profit_price,
        };
        move_with * self.position_size / self.current_price
    }
}

/// What actually happened once the trade was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExecution {
    pub status: ExecutionStatus,
    pub direction: Direction,
    pub position_size: Option<Decimal>,
    pub enter_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl TradeExecution {
    /// Signed price move from entry to exit, with the entry price.
    fn price_move(&self) -> Option<(Decimal, Decimal)> {
        let enter = self.enter_price?;
        let exit = self.exit_price?;
        if enter.is_zero() {
            return None;
        }
        let diff = match self.direction {
            Direction::Long => exit - enter,
            Direction::Short => enter - exit,
        };
        Some((diff, enter))
    }

    /// PnL in percent of the entry price; zero when prices are missing.
    pub fn pnl_pct(&self) -> Decimal {
        self.price_move()
            .map(|(diff, enter)| diff * Decimal::ONE_HUNDRED / enter)
            .unwrap_or(Decimal::ZERO)
    }

    /// PnL in quote currency implied by prices and size.
    pub fn pnl_amount(&self) -> Decimal {
        match (self.price_move(), self.position_size) {
            (Some((diff, enter)), Some(size)) => diff * size / enter,
            _ => Decimal::ZERO,
        }
    }

    /// Recorded PnL if present, otherwise the amount implied by prices.
    pub fn realized_pnl(&self) -> Decimal {
        self.pnl.unwrap_or_else(|| self.pnl_amount())
    }

    pub fn apply(&mut self, update: &ExecutionUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(direction) = update.direction {
            self.direction = direction;
        }
        if update.position_size.is_some() {
            self.position_size = update.position_size;
        }
        if update.enter_price.is_some() {
            self.enter_price = update.enter_price;
        }
        if update.exit_price.is_some() {
            self.exit_price = update.exit_price;
        }
        if update.pnl.is_some() {
            self.pnl = update.pnl;
        }
        if update.started_at.is_some() {
            self.started_at = update.started_at;
        }
        if update.ended_at.is_some() {
            self.ended_at = update.ended_at;
        }
    }
}

/// A persisted journal entry. Several records may share a `trade_id`:
/// the accepted plan plus any executions added later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub trade_id: i64,
    pub symbol: String,
    pub total_assets: Decimal,
    pub plan: Option<TradePlan>,
    pub execution: TradeExecution,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Sort key for history listings: plan start, newest first, unplanned last.
    pub fn plan_started_at(&self) -> Option<DateTime<Utc>> {
        self.plan.as_ref().map(|p| p.started_at)
    }
}

/// Insert payload. A `None` trade id is allocated by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTradeRecord {
    pub trade_id: Option<i64>,
    pub symbol: String,
    pub total_assets: Decimal,
    pub plan: Option<TradePlan>,
    pub execution: TradeExecution,
    pub review: Option<String>,
}

impl NewTradeRecord {
    /// A fresh record carrying the same execution under the same trade id.
    pub fn follow_up(record: &TradeRecord) -> Self {
        Self {
            trade_id: Some(record.trade_id),
            symbol: record.symbol.clone(),
            total_assets: record.total_assets,
            plan: None,
            execution: record.execution.clone(),
            review: record.review.clone(),
        }
    }
}

/// Partial execution update; only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionUpdate {
    pub status: Option<ExecutionStatus>,
    pub direction: Option<Direction>,
    pub position_size: Option<Decimal>,
    pub enter_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ExecutionUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.direction.is_none()
            && self.position_size.is_none()
            && self.enter_price.is_none()
            && self.exit_price.is_none()
            && self.pnl.is_none()
            && self.started_at.is_none()
            && self.ended_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn execution(direction: Direction) -> TradeExecution {
        TradeExecution {
            status: ExecutionStatus::Ongoing,
            direction,
            position_size: Some(dec!(10000)),
            enter_price: Some(dec!(100)),
            exit_price: Some(dec!(110)),
            pnl: None,
            started_at: None,
            ended_at: None,
        }
    }

    #[test]
    fn test_long_pnl() {
        let exec = execution(Direction::Long);
        assert_eq!(exec.pnl_pct(), dec!(10));
        assert_eq!(exec.pnl_amount(), dec!(1000));
    }

    #[test]
    fn test_short_pnl_is_inverted() {
        let exec = execution(Direction::Short);
        assert_eq!(exec.pnl_pct(), dec!(-10));
        assert_eq!(exec.pnl_amount(), dec!(-1000));
    }

    #[test]
    fn test_pnl_without_size_is_zero() {
        let exec = TradeExecution {
            position_size: None,
            ..execution(Direction::Long)
        };
        assert_eq!(exec.pnl_amount(), Decimal::ZERO);
        assert_eq!(exec.pnl_pct(), dec!(10));
    }

    #[test]
    fn test_recorded_pnl_wins_over_implied() {
        let exec = TradeExecution {
            pnl: Some(dec!(-42)),
            ..execution(Direction::Long)
        };
        assert_eq!(exec.realized_pnl(), dec!(-42));
    }

    #[test]
    fn test_plan_amounts() {
        let plan = TradePlan {
            current_price: dec!(2667),
            direction: Direction::Short,
            stop_loss_price: dec!(2700),
            take_profit_price: dec!(2500),
            win_ratio: dec!(0.6),
            max_loss_pct: dec!(0.02),
            position_size: dec!(26670),
            started_at: Utc::now(),
        };
        assert_eq!(plan.max_loss_amount(), dec!(330));
        assert_eq!(plan.target_profit_amount(), dec!(1670));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut exec = execution(Direction::Long);
        exec.apply(&ExecutionUpdate {
            status: Some(ExecutionStatus::Win),
            exit_price: Some(dec!(120)),
            ..Default::default()
        });
        assert_eq!(exec.status, ExecutionStatus::Win);
        assert_eq!(exec.exit_price, Some(dec!(120)));
        assert_eq!(exec.enter_price, Some(dec!(100)));
    }
}
