pub mod import;
pub mod review;
pub mod summary;

pub use import::{parse_closed_pnl, ImportError};
pub use review::{review_or_template, REVIEW_TEMPLATE};
pub use summary::JournalSummary;
