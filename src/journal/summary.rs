use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{ExecutionStatus, TradeRecord};

/// Aggregate figures over the whole journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalSummary {
    pub total_records: usize,
    pub distinct_trades: usize,
    pub ongoing: usize,
    pub wins: usize,
    pub losses: usize,
    /// Wins over closed records, 0..=1. Zero when nothing is closed.
    pub win_rate: Decimal,
    /// Sum of realised PnL over closed records.
    pub total_pnl: Decimal,
    pub best_pnl: Option<Decimal>,
    pub worst_pnl: Option<Decimal>,
}

impl JournalSummary {
    pub fn from_records(records: &[TradeRecord]) -> Self {
        let mut trade_ids = HashSet::new();
        let (mut ongoing, mut wins, mut losses) = (0, 0, 0);
        let mut total_pnl = Decimal::ZERO;
        let mut best_pnl: Option<Decimal> = None;
        let mut worst_pnl: Option<Decimal> = None;

        for record in records {
            trade_ids.insert(record.trade_id);

            match record.execution.status {
                ExecutionStatus::Ongoing => {
                    ongoing += 1;
                    continue;
                }
                ExecutionStatus::Win => wins += 1,
                ExecutionStatus::Lose => losses += 1,
            }

            let pnl = record.execution.realized_pnl();
            total_pnl += pnl;
            best_pnl = Some(best_pnl.map_or(pnl, |b| b.max(pnl)));
            worst_pnl = Some(worst_pnl.map_or(pnl, |w| w.min(pnl)));
        }

        let closed = wins + losses;
        let win_rate = if closed == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(wins) / Decimal::from(closed)
        };

        Self {
            total_records: records.len(),
            distinct_trades: trade_ids.len(),
            ongoing,
            wins,
            losses,
            win_rate,
            total_pnl,
            best_pnl,
            worst_pnl,
        }
    }
}
