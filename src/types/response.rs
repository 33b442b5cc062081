//! Records returned by the bots, deals and accounts endpoints.
//!
//! Only the fields this crate relies on are declared; 3Commas returns many more, which are
//! ignored (and logged with the `tracing` feature).

use serde::{Deserialize, Serialize};

use super::{BotStrategy, DateTime, DealStatus, Decimal, Utc};

/// A DCA bot, as returned by `GET /ver1/bots` and the bot action endpoints.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: i64,
    pub account_id: i64,
    pub is_enabled: bool,
    pub name: String,
    pub pairs: Vec<String>,
    pub strategy: Option<BotStrategy>,
    pub base_order_volume: Option<Decimal>,
    pub safety_order_volume: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    #[serde(default)]
    pub max_active_deals: u32,
    #[serde(default)]
    pub active_deals_count: u32,
    pub finished_deals_count: Option<Decimal>,
    pub finished_deals_profit_usd: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A deal opened by a bot, as returned by `GET /ver1/deals`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub bot_id: i64,
    pub account_id: i64,
    pub bot_name: Option<String>,
    pub pair: String,
    pub status: DealStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub bought_amount: Option<Decimal>,
    pub bought_volume: Option<Decimal>,
    pub sold_amount: Option<Decimal>,
    pub sold_volume: Option<Decimal>,
    pub final_profit: Option<Decimal>,
    pub usd_final_profit: Option<Decimal>,
    pub actual_profit: Option<Decimal>,
    #[serde(default)]
    pub completed_safety_orders_count: u32,
}

impl Deal {
    /// Whether the deal is still open on the exchange.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.closed_at.is_none()
    }
}

/// An exchange account connected to 3Commas, as returned by `GET /ver1/accounts`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub exchange_name: String,
    pub market_code: String,
    pub usd_amount: Option<Decimal>,
    pub btc_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
