//! Filters for the listing endpoints.
//!
//! These serialize into the extra query parameters appended after the credentials and the
//! `limit`/`offset` window (see [`crate::ToQueryParams::extra_params`]).

#![allow(
    clippy::module_name_repetitions,
    reason = "Request suffix is intentional for clarity"
)]

use bon::Builder;
use serde::Serialize;
use serde_with::skip_serializing_none;

use super::{BotScope, BotStrategy, DealScope};

/// Filters for `GET /ver1/bots`.
///
/// # Example
///
/// ```
/// use threecommas_client::types::BotScope;
/// use threecommas_client::types::request::BotsRequest;
///
/// let request = BotsRequest::builder()
///     .scope(BotScope::Enabled)
///     .account_id(31_337)
///     .build();
/// ```
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Builder, Serialize)]
#[non_exhaustive]
pub struct BotsRequest {
    pub scope: Option<BotScope>,
    pub account_id: Option<i64>,
    pub strategy: Option<BotStrategy>,
}

/// Filters for `GET /ver1/deals`.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Builder, Serialize)]
#[non_exhaustive]
pub struct DealsRequest {
    pub scope: Option<DealScope>,
    pub bot_id: Option<i64>,
    pub account_id: Option<i64>,
}
