//! Lists the bots, accounts and active deals of a 3Commas account.
//!
//! Reads the API key and secret from `THREECOMMAS_API_KEY` and `THREECOMMAS_API_SECRET`.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info,hyper_util=off,hyper=off,reqwest=off,h2=off,rustls=off cargo run --example bots --features tracing
//! ```
//!
//! Optionally log to a file:
//! ```sh
//! LOG_FILE=bots.log RUST_LOG=info,hyper_util=off,hyper=off,reqwest=off,h2=off,rustls=off cargo run --example bots --features tracing
//! ```

use std::fs::File;

use threecommas_client::Client;
use threecommas_client::auth::Credentials;
use threecommas_client::types::request::{BotsRequest, DealsRequest};
use threecommas_client::types::{BotScope, DealScope};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let client = Client::default();
    let credentials = Credentials::from_env()?;

    match client.accounts(&credentials).await {
        Ok(accounts) => {
            for account in &accounts {
                info!(
                    endpoint = "accounts",
                    id = account.id,
                    name = %account.name,
                    exchange = %account.exchange_name,
                    usd = ?account.usd_amount
                );
            }
        }
        Err(e) => error!(endpoint = "accounts", error = %e),
    }

    let request = BotsRequest::builder().scope(BotScope::Enabled).build();
    let bots = match client.bots(&credentials, &request).await {
        Ok(bots) => {
            info!(endpoint = "bots", count = bots.len());
            bots
        }
        Err(e) => {
            error!(endpoint = "bots", error = %e);
            Vec::new()
        }
    };

    for bot in bots.iter().filter(|bot| bot.active_deals_count > 0) {
        let request = DealsRequest::builder()
            .scope(DealScope::Active)
            .bot_id(bot.id)
            .build();

        match client.deals(&credentials, &request).await {
            Ok(deals) => {
                for deal in deals {
                    info!(
                        endpoint = "deals",
                        bot = %bot.name,
                        pair = %deal.pair,
                        status = %deal.status,
                        profit = ?deal.actual_profit
                    );
                }
            }
            Err(e) => error!(endpoint = "deals", bot_id = bot.id, error = %e),
        }
    }

    // Raw access for endpoints without a typed wrapper
    let envelope = client
        .get(&credentials, "/ver1/users/current_mode", "")
        .await?;
    info!(endpoint = "current_mode", status = %envelope.status, data = ?envelope.data);

    Ok(())
}
