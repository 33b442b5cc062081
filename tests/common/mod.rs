#![allow(
    unused,
    reason = "Not every integration test binary uses every helper"
)]

use std::time::Duration;

use httpmock::MockServer;
use serde_json::{Value, json};
use threecommas_client::auth::Credentials;
use threecommas_client::retry::{Backoff, RetryConfig};
use threecommas_client::{Client, Config};

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";

pub const APIKEY: &str = "APIKEY";
pub const SIGNATURE: &str = "Signature";

/// HMAC-SHA256 of `/public/api/ver1/accounts?api_key=test-key&secret=test-secret` keyed with
/// `test-secret`.
pub const ACCOUNTS_SIGNATURE: &str =
    "ccfedf5f16ee595cce14f4bac9d68bb8b801fa1acdccbf45f1aab2aa026bd39b";

/// HMAC-SHA256 of `/public/api/ver1/bots?api_key=test-key&secret=test-secret&limit=1000&offset=0`
/// keyed with `test-secret`.
pub const FIRST_BOTS_PAGE_SIGNATURE: &str =
    "3e7b1f12f86f908f8dfedeeee1b41a52ddc9c3717069b4ec33e9d6a3760e0902";

/// HMAC-SHA256 of `/public/api/ver1/deals?api_key=test-key&secret=test-secret&note=a%20b`, the
/// percent-encoded form that goes on the wire for the param `&note=a b`.
pub const ENCODED_NOTE_SIGNATURE: &str =
    "08b91a915af62419ae36ae8d0a29c5a5bb790d330267c650220dd782fe45fba1";

#[must_use]
pub fn credentials() -> Credentials {
    Credentials::new(API_KEY.to_owned(), API_SECRET.to_owned())
}

/// Client pointed at `server` whose rate-limit retries never sleep.
pub fn create_client(server: &MockServer, offset_ceiling: u32) -> anyhow::Result<Client> {
    let config = Config::builder()
        .offset_ceiling(offset_ceiling)
        .retry(RetryConfig::new(3, Duration::ZERO, Backoff::Fixed(Duration::ZERO)))
        .build();

    Ok(Client::new(&server.base_url(), config)?)
}

#[must_use]
pub fn records(count: usize) -> Value {
    Value::Array((0..count).map(|id| json!({ "id": id })).collect())
}

#[must_use]
pub fn bot_json(id: i64, is_enabled: bool) -> Value {
    json!({
        "id": id,
        "account_id": 31_337,
        "is_enabled": is_enabled,
        "name": "BTC long",
        "pairs": ["USDT_BTC"],
        "strategy": "long",
        "base_order_volume": "10.0",
        "safety_order_volume": "20.0",
        "take_profit": "1.5",
        "max_active_deals": 1,
        "active_deals_count": 0,
        "finished_deals_count": "3",
        "finished_deals_profit_usd": "1.23",
        "created_at": "2021-06-18T14:21:42.227Z",
        "updated_at": "2021-06-19T09:00:00.000Z",
        "trailing_enabled": false
    })
}
