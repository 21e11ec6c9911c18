pub mod trade_record;

pub use trade_record::{ExecutionUpdate, NewTradeRecord, TradeExecution, TradePlan, TradeRecord};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    /// Exchange exports label sides as BUY/SELL; journal entries use long/short.
    pub fn from_trade_side(side: &str) -> Self {
        match side.trim().to_lowercase().as_str() {
            "sell" | "short" => Direction::Short,
            _ => Direction::Long,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExecutionStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Ongoing,
    Win,
    Lose,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Ongoing => "ongoing",
            ExecutionStatus::Win => "win",
            ExecutionStatus::Lose => "lose",
        }
    }

    pub fn is_closed(&self) -> bool {
        !matches!(self, ExecutionStatus::Ongoing)
    }
}

impl FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ongoing" => Ok(ExecutionStatus::Ongoing),
            "win" => Ok(ExecutionStatus::Win),
            "lose" => Ok(ExecutionStatus::Lose),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
