pub mod binance;
pub mod cache;

pub use binance::{PriceFeedClient, PriceFeedError, PriceTick};
pub use cache::PriceCache;
