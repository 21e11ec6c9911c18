use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;

use trade_journal::db::{self, trade_repo};
use trade_journal::journal::parse_closed_pnl;

/// Import a Bybit closed-PnL CSV export into the trade journal.
#[derive(Debug, Parser)]
#[command(name = "import-closed-pnl", version)]
struct Args {
    /// Path to the CSV export
    #[arg(long)]
    file: PathBuf,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Account size recorded on each imported trade
    #[arg(long, default_value = "0")]
    total_assets: Decimal,

    /// Parse and print, without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let records = parse_closed_pnl(file, args.total_assets)?;
    tracing::info!(rows = records.len(), file = %args.file.display(), "CSV parsed");

    if args.dry_run {
        for record in &records {
            tracing::info!(
                symbol = %record.symbol,
                direction = %record.execution.direction,
                status = %record.execution.status,
                pnl = ?record.execution.pnl,
                "Would import"
            );
        }
        return Ok(());
    }

    let url = args
        .database_url
        .context("DATABASE_URL or --database-url is required unless --dry-run is set")?;
    let pool = db::init_pool(&url).await?;

    let total = records.len();
    for (idx, record) in records.iter().enumerate() {
        let stored = trade_repo::insert_trade(&pool, record).await?;
        tracing::info!(
            trade_id = stored.trade_id,
            symbol = %stored.symbol,
            "Inserted record {} of {}",
            idx + 1,
            total
        );
    }

    tracing::info!(total, "All records imported");
    Ok(())
}
