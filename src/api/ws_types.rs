use serde::Serialize;
use uuid::Uuid;

use crate::models::TradeRecord;
use crate::price_feed::PriceTick;

/// Messages broadcast to all connected WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "trade_created")]
    TradeCreated(TradeRecord),

    #[serde(rename = "trade_updated")]
    TradeUpdated(TradeRecord),

    #[serde(rename = "trade_deleted")]
    TradeDeleted { id: Uuid },

    #[serde(rename = "price_update")]
    PriceUpdate(PriceTick),
}
