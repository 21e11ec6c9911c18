use crate::models::TradeRecord;

/// Markdown skeleton offered for records that have not been reviewed yet.
pub const REVIEW_TEMPLATE: &str = "\
## Setup
- Why did I take this trade?
- Which timeframe and signal triggered the entry?

## Execution
- Did I enter at the planned price?
- Did I respect the stop-loss and take-profit levels?

## Outcome
- Result versus plan:
- What went well?
- What went wrong?

## Lessons
- What will I do differently next time?
";

/// The saved review, or the template when none exists or it is blank.
pub fn review_or_template(record: &TradeRecord) -> (&str, bool) {
    match record.review.as_deref() {
        Some(text) if !text.trim().is_empty() => (text, false),
        _ => (REVIEW_TEMPLATE, true),
    }
}
