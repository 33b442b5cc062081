//! Typed records for the bots, deals and accounts endpoint families.
//!
//! Also re-exports the decimal and date types used in them, so users don't need to add these
//! dependencies to their `Cargo.toml`.

pub mod request;
pub mod response;

/// Date and time types for timestamps in API responses.
pub use chrono::{DateTime, Utc};
/// Arbitrary precision decimal type for prices, volumes and profits. 3Commas sends these as
/// strings, which [`Decimal`] decodes without loss.
pub use rust_decimal::Decimal;
/// Macro for creating [`Decimal`] literals at compile time.
///
/// # Example
/// ```
/// use threecommas_client::types::dec;
/// let take_profit = dec!(1.5);
/// ```
pub use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Filter for `GET /ver1/bots`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BotScope {
    Enabled,
    Disabled,
}

/// Trade direction of a DCA bot.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BotStrategy {
    Long,
    Short,
}

/// Filter for `GET /ver1/deals`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DealScope {
    Active,
    Finished,
    Completed,
    Cancelled,
    Failed,
}

/// Lifecycle state of a deal.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DealStatus {
    Created,
    BaseOrderPlaced,
    Bought,
    Cancelled,
    Completed,
    Failed,
    PanicSellPending,
    PanicSellOrderPlaced,
    PanicSold,
    CancelPending,
    StopLossPending,
    StopLossFinished,
    StopLossOrderPlaced,
    Switched,
    SwitchedTakeProfit,
    TtpActivated,
    TtpOrderPlaced,
    Liquidated,
    BoughtSafetyPending,
    BoughtTakeProfitPending,
    SettlePending,
    SettleFinished,
    SettleOrderPlaced,
    /// A status added to the API after this crate was released.
    #[serde(other)]
    Unknown,
}

/// State change requested through `POST /ver1/bots/{id}/{action}`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum BotAction {
    Enable,
    Disable,
    /// Open a new deal right away instead of waiting for the start condition.
    StartNewDeal,
    /// Panic sell every active deal of the bot.
    PanicSellAllDeals,
    /// Cancel every active deal of the bot.
    CancelAllDeals,
}
