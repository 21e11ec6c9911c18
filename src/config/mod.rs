use rust_decimal::Decimal;
use std::env;

use crate::evaluation::{RiskProfile, DEFAULT_MAX_LOSS_PCT, DEFAULT_MUST_TP_PCT};

const DEFAULT_PRICE_FEED_URL: &str = "https://api.binance.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,

    /// Bearer token for `/api/*` routes (auth disabled when unset).
    pub api_token: Option<String>,
    pub log_format: LogFormat,

    // Evaluator defaults (runtime overrides live in runtime_config)
    pub max_loss_pct: Decimal,
    pub must_tp_pct: Decimal,

    // Price feed
    pub price_feed_url: String,
    pub price_symbols: Vec<String>,
    pub price_poll_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let symbols_raw = env::var("PRICE_SYMBOLS").unwrap_or_else(|_| "ETHUSDT".into());
        let price_symbols: Vec<String> = symbols_raw
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_loss_pct: Decimal = match env::var("MAX_LOSS_PCT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("MAX_LOSS_PCT is not a decimal: {e}"))?,
            Err(_) => DEFAULT_MAX_LOSS_PCT,
        };
        let must_tp_pct: Decimal = match env::var("MUST_TP_PCT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("MUST_TP_PCT is not a decimal: {e}"))?,
            Err(_) => DEFAULT_MUST_TP_PCT,
        };

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            api_token: env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },

            max_loss_pct,
            must_tp_pct,

            price_feed_url: env::var("PRICE_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_PRICE_FEED_URL.into()),
            price_symbols,
            price_poll_interval_secs: env::var("PRICE_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
        };

        config.risk_profile().validate()?;
        Ok(config)
    }

    /// Risk profile from environment defaults, before runtime overrides.
    pub fn risk_profile(&self) -> RiskProfile {
        RiskProfile {
            max_loss_pct: self.max_loss_pct,
            must_tp_pct: self.must_tp_pct,
        }
    }

    /// Returns true if a Postgres database is configured.
    pub fn has_database(&self) -> bool {
        self.database_url.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 8080,
            api_token: None,
            log_format: LogFormat::Pretty,
            max_loss_pct: DEFAULT_MAX_LOSS_PCT,
            must_tp_pct: DEFAULT_MUST_TP_PCT,
            price_feed_url: DEFAULT_PRICE_FEED_URL.into(),
            price_symbols: vec!["ETHUSDT".into()],
            price_poll_interval_secs: 10,
        }
    }
}
