use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// `GET /api/v3/ticker/price` payload. Prices arrive as strings.
#[derive(Debug, Clone, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: Decimal,
}

/// A price observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub symbol: String,
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// Upper-cases and checks a trading pair such as `ethusdt`.
pub fn normalize_symbol(raw: &str) -> Result<String, PriceFeedError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PriceFeedError::InvalidSymbol(raw.to_string()));
    }
    Ok(symbol)
}

/// Client for a Binance-compatible spot ticker endpoint.
#[derive(Debug, Clone)]
pub struct PriceFeedClient {
    http: Client,
    base_url: String,
}

impl PriceFeedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the latest traded price for `symbol`.
    pub async fn get_price(&self, symbol: &str) -> Result<PriceTick, PriceFeedError> {
        let symbol = normalize_symbol(symbol)?;
        // Symbols are validated alphanumeric, so no query encoding is needed.
        let url = format!("{}/api/v3/ticker/price?symbol={symbol}", self.base_url);

        let resp = self.http.get(&url).send().await?;

        if resp.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(PriceFeedError::InvalidSymbol(symbol));
        }
        let ticker: TickerPrice = resp.error_for_status()?.json().await?;

        if ticker.symbol != symbol {
            return Err(PriceFeedError::Unexpected(format!(
                "asked for {symbol}, got {}",
                ticker.symbol
            )));
        }
        if ticker.price <= Decimal::ZERO {
            return Err(PriceFeedError::Unexpected(format!(
                "non-positive price {} for {symbol}",
                ticker.price
            )));
        }

        Ok(PriceTick {
            symbol,
            price: ticker.price,
            fetched_at: Utc::now(),
        })
    }
}
