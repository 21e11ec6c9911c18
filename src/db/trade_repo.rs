use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{
    Direction, ExecutionStatus, ExecutionUpdate, NewTradeRecord, TradeExecution, TradePlan,
    TradeRecord,
};

/// Database row for trade_history table.
#[derive(Debug, Clone, FromRow)]
pub struct TradeRecordRow {
    pub id: Uuid,
    pub trade_id: i64,
    pub symbol: String,
    pub total_assets: Decimal,
    pub plan_current_price: Option<Decimal>,
    pub plan_direction: Option<String>,
    pub plan_stop_loss_price: Option<Decimal>,
    pub plan_take_profit_price: Option<Decimal>,
    pub plan_win_ratio: Option<Decimal>,
    pub plan_max_loss_pct: Option<Decimal>,
    pub plan_position_size: Option<Decimal>,
    pub plan_started_at: Option<DateTime<Utc>>,
    pub status: String,
    pub direction: String,
    pub position_size: Option<Decimal>,
    pub enter_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TradeRecordRow> for TradeRecord {
    type Error = anyhow::Error;

    fn try_from(row: TradeRecordRow) -> anyhow::Result<Self> {
        // A plan is stored all-or-nothing; current price marks its presence.
        let plan = match row.plan_current_price {
            Some(current_price) => {
                let missing = |field: &str| {
                    anyhow::anyhow!("trade_history {}: plan column {field} is NULL", row.id)
                };
                Some(TradePlan {
                    current_price,
                    direction: row
                        .plan_direction
                        .as_deref()
                        .ok_or_else(|| missing("plan_direction"))?
                        .parse::<Direction>()
                        .map_err(anyhow::Error::msg)?,
                    stop_loss_price: row
                        .plan_stop_loss_price
                        .ok_or_else(|| missing("plan_stop_loss_price"))?,
                    take_profit_price: row
                        .plan_take_profit_price
                        .ok_or_else(|| missing("plan_take_profit_price"))?,
                    win_ratio: row.plan_win_ratio.ok_or_else(|| missing("plan_win_ratio"))?,
                    max_loss_pct: row
                        .plan_max_loss_pct
                        .ok_or_else(|| missing("plan_max_loss_pct"))?,
                    position_size: row
                        .plan_position_size
                        .ok_or_else(|| missing("plan_position_size"))?,
                    started_at: row.plan_started_at.ok_or_else(|| missing("plan_started_at"))?,
                })
            }
            None => None,
        };

        Ok(TradeRecord {
            id: row.id,
            trade_id: row.trade_id,
            symbol: row.symbol,
            total_assets: row.total_assets,
            plan,
            execution: TradeExecution {
                status: row.status.parse::<ExecutionStatus>().map_err(anyhow::Error::msg)?,
                direction: row.direction.parse::<Direction>().map_err(anyhow::Error::msg)?,
                position_size: row.position_size,
                enter_price: row.enter_price,
                exit_price: row.exit_price,
                pnl: row.pnl,
                started_at: row.started_at,
                ended_at: row.ended_at,
            },
            review: row.review,
            created_at: row.created_at,
        })
    }
}

fn into_records(rows: Vec<TradeRecordRow>) -> anyhow::Result<Vec<TradeRecord>> {
    rows.into_iter().map(TradeRecord::try_from).collect()
}

/// Advisory lock key serialising trade id allocation across connections.
const TRADE_ID_LOCK: i64 = 0x7472_6164_655f_6964;

/// Insert a trade record. When `trade_id` is `None` the next id is allocated
/// while holding a transaction-scoped advisory lock.
pub async fn insert_trade(pool: &PgPool, record: &NewTradeRecord) -> anyhow::Result<TradeRecord> {
    let plan = record.plan.as_ref();
    let exec = &record.execution;

    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(TRADE_ID_LOCK)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, TradeRecordRow>(
        r#"
        INSERT INTO trade_history (
            trade_id, symbol, total_assets,
            plan_current_price, plan_direction, plan_stop_loss_price, plan_take_profit_price,
            plan_win_ratio, plan_max_loss_pct, plan_position_size, plan_started_at,
            status, direction, position_size, enter_price, exit_price, pnl, started_at, ended_at,
            review
        )
        VALUES (
            COALESCE($1, (SELECT COALESCE(MAX(trade_id), 0) + 1 FROM trade_history)), $2, $3,
            $4, $5, $6, $7, $8, $9, $10, $11,
            $12, $13, $14, $15, $16, $17, $18, $19,
            $20
        )
        RETURNING *
        "#,
    )
    .bind(record.trade_id)
    .bind(&record.symbol)
    .bind(record.total_assets)
    .bind(plan.map(|p| p.current_price))
    .bind(plan.map(|p| p.direction.as_str()))
    .bind(plan.map(|p| p.stop_loss_price))
    .bind(plan.map(|p| p.take_profit_price))
    .bind(plan.map(|p| p.win_ratio))
    .bind(plan.map(|p| p.max_loss_pct))
    .bind(plan.map(|p| p.position_size))
    .bind(plan.map(|p| p.started_at))
    .bind(exec.status.as_str())
    .bind(exec.direction.as_str())
    .bind(exec.position_size)
    .bind(exec.enter_price)
    .bind(exec.exit_price)
    .bind(exec.pnl)
    .bind(exec.started_at)
    .bind(exec.ended_at)
    .bind(record.review.as_deref())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    row.try_into()
}

/// Get all records, newest plan first; records without a plan come last.
pub async fn get_all_trades(pool: &PgPool) -> anyhow::Result<Vec<TradeRecord>> {
    let rows = sqlx::query_as::<_, TradeRecordRow>(
        "SELECT * FROM trade_history ORDER BY plan_started_at DESC NULLS LAST, created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    into_records(rows)
}

pub async fn get_trade_by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<TradeRecord>> {
    let row = sqlx::query_as::<_, TradeRecordRow>("SELECT * FROM trade_history WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(TradeRecord::try_from).transpose()
}

/// Get every record that belongs to one trade, oldest first.
pub async fn get_trades_by_trade_id(
    pool: &PgPool,
    trade_id: i64,
) -> anyhow::Result<Vec<TradeRecord>> {
    let rows = sqlx::query_as::<_, TradeRecordRow>(
        "SELECT * FROM trade_history WHERE trade_id = $1 ORDER BY created_at ASC",
    )
    .bind(trade_id)
    .fetch_all(pool)
    .await?;

    into_records(rows)
}

pub async fn get_trades_by_status(
    pool: &PgPool,
    status: ExecutionStatus,
) -> anyhow::Result<Vec<TradeRecord>> {
    let rows = sqlx::query_as::<_, TradeRecordRow>(
        r#"
        SELECT * FROM trade_history
        WHERE status = $1
        ORDER BY plan_started_at DESC NULLS LAST, created_at DESC
        "#,
    )
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    into_records(rows)
}

pub async fn count_trades(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trade_history")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

pub async fn count_distinct_trade_ids(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT trade_id) FROM trade_history")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Next free trade id; 1 when the journal is empty.
pub async fn next_trade_id(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(trade_id), 0) + 1 FROM trade_history")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Apply a partial execution update. Returns `None` if the record is gone.
pub async fn update_execution(
    pool: &PgPool,
    id: Uuid,
    update: &ExecutionUpdate,
) -> anyhow::Result<Option<TradeRecord>> {
    let row = sqlx::query_as::<_, TradeRecordRow>(
        r#"
        UPDATE trade_history
        SET status        = COALESCE($2, status),
            direction     = COALESCE($3, direction),
            position_size = COALESCE($4, position_size),
            enter_price   = COALESCE($5, enter_price),
            exit_price    = COALESCE($6, exit_price),
            pnl           = COALESCE($7, pnl),
            started_at    = COALESCE($8, started_at),
            ended_at      = COALESCE($9, ended_at)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(update.status.map(|s| s.as_str()))
    .bind(update.direction.map(|d| d.as_str()))
    .bind(update.position_size)
    .bind(update.enter_price)
    .bind(update.exit_price)
    .bind(update.pnl)
    .bind(update.started_at)
    .bind(update.ended_at)
    .fetch_optional(pool)
    .await?;

    row.map(TradeRecord::try_from).transpose()
}

pub async fn update_review(
    pool: &PgPool,
    id: Uuid,
    review: &str,
) -> anyhow::Result<Option<TradeRecord>> {
    let row = sqlx::query_as::<_, TradeRecordRow>(
        "UPDATE trade_history SET review = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(review)
    .fetch_optional(pool)
    .await?;

    row.map(TradeRecord::try_from).transpose()
}

/// Delete a record. Returns false if nothing was deleted.
pub async fn delete_trade(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM trade_history WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
