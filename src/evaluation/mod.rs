pub mod evaluator;
pub mod format;

pub use evaluator::{
    evaluate, EvaluationError, EvaluationResult, RiskProfile, TradeProposal, DEFAULT_MAX_LOSS_PCT,
    DEFAULT_MUST_TP_PCT,
};
