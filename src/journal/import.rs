use std::io::Read;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{Direction, ExecutionStatus, NewTradeRecord, TradeExecution};

const EXPORT_TIME_FORMAT: &str = "%H:%M %Y-%m-%d";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// One row of a Bybit closed-PnL export.
#[derive(Debug, Deserialize)]
struct ClosedPnlRow {
    #[serde(rename = "Contracts")]
    contracts: String,
    #[serde(rename = "Trade Type")]
    trade_type: String,
    #[serde(rename = "Qty", with = "rust_decimal::serde::str")]
    qty: Decimal,
    #[serde(rename = "Entry Price", with = "rust_decimal::serde::str")]
    entry_price: Decimal,
    #[serde(rename = "Filled Price", with = "rust_decimal::serde::str")]
    filled_price: Decimal,
    #[serde(rename = "Realized P&L", with = "rust_decimal::serde::str")]
    realized_pnl: Decimal,
    #[serde(rename = "Create Time")]
    create_time: String,
    #[serde(rename = "Filled/Settlement Time(UTC+0)")]
    filled_time: String,
}

fn parse_export_time(raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(raw.trim(), EXPORT_TIME_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            warn!(timestamp = raw, error = %e, "Failed to parse timestamp");
            None
        }
    }
}

/// Parse a closed-PnL CSV into journal records, oldest first.
///
/// Exports list the newest fill first. Records carry no plan and no trade id,
/// so the store allocates consecutive ids in insertion order.
pub fn parse_closed_pnl<R: Read>(
    reader: R,
    total_assets: Decimal,
) -> Result<Vec<NewTradeRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<ClosedPnlRow>().enumerate() {
        let row = result?;
        let symbol = row.contracts.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ImportError::InvalidRow {
                row: idx + 1,
                reason: "empty Contracts".into(),
            });
        }

        let status = if row.realized_pnl > Decimal::ZERO {
            ExecutionStatus::Win
        } else {
            ExecutionStatus::Lose
        };

        records.push(NewTradeRecord {
            trade_id: None,
            symbol,
            total_assets,
            plan: None,
            execution: TradeExecution {
                status,
                direction: Direction::from_trade_side(&row.trade_type),
                position_size: Some(row.qty * row.entry_price),
                enter_price: Some(row.entry_price),
                exit_price: Some(row.filled_price),
                pnl: Some(row.realized_pnl),
                started_at: parse_export_time(&row.create_time),
                ended_at: parse_export_time(&row.filled_time),
            },
            review: None,
        });
    }

    records.reverse();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const EXPORT: &str = "\
Contracts,Closing Direction,Qty,Entry Price,Filled Price,Realized P&L,Trade Type,Create Time,Filled/Settlement Time(UTC+0)
ETHUSDT,Close Short,2,2600,2550,99.5,SELL,09:15 2025-06-06,11:40 2025-06-06
BTCUSDT ,Close Long,0.01,105000,104000,-10.2,BUY,not a time,08:05 2025-06-05
";

    #[test]
    fn test_rows_are_imported_oldest_first() {
        let records = parse_closed_pnl(EXPORT.as_bytes(), dec!(10000)).unwrap();
        assert_eq!(records.len(), 2);

        let btc = &records[0];
        assert_eq!(btc.symbol, "BTCUSDT");
        assert_eq!(btc.execution.direction, Direction::Long);
        assert_eq!(btc.execution.status, ExecutionStatus::Lose);
        assert_eq!(btc.execution.position_size, Some(dec!(1050)));
        assert_eq!(btc.execution.started_at, None);
        assert_eq!(
            btc.execution.ended_at,
            Some(Utc.with_ymd_and_hms(2025, 6, 5, 8, 5, 0).unwrap())
        );

        let eth = &records[1];
        assert_eq!(eth.execution.direction, Direction::Short);
        assert_eq!(eth.execution.status, ExecutionStatus::Win);
        assert_eq!(eth.execution.position_size, Some(dec!(5200)));
        assert_eq!(eth.execution.pnl, Some(dec!(99.5)));
        assert!(eth.plan.is_none());
        assert!(eth.trade_id.is_none());
    }

    #[test]
    fn test_zero_pnl_counts_as_lose() {
        let csv = "\
Contracts,Trade Type,Qty,Entry Price,Filled Price,Realized P&L,Create Time,Filled/Settlement Time(UTC+0)
SOLUSDT,BUY,1,150,150,0,10:00 2025-06-01,10:30 2025-06-01
";
        let records = parse_closed_pnl(csv.as_bytes(), dec!(1000)).unwrap();
        assert_eq!(records[0].execution.status, ExecutionStatus::Lose);
    }

    #[test]
    fn test_bad_number_is_csv_error() {
        let csv = "\
Contracts,Trade Type,Qty,Entry Price,Filled Price,Realized P&L,Create Time,Filled/Settlement Time(UTC+0)
SOLUSDT,BUY,abc,150,150,0,10:00 2025-06-01,10:30 2025-06-01
";
        let err = parse_closed_pnl(csv.as_bytes(), dec!(1000)).unwrap_err();
        assert!(matches!(err, ImportError::Csv(_)));
    }
}
