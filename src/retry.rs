//! Rate-limit handling.
//!
//! 3Commas answers `429 Too Many Requests` when an account exceeds its request budget. The
//! [`Retrier`] waits and sends the same signed request again, up to
//! [`RetryConfig::max_attempts`] times. Waiting goes through the [`Clock`] trait so that tests can
//! observe delays without sleeping.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff as _;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::Result;
use crate::auth::Credentials;
use crate::error::Error;
use crate::response::Envelope;
use crate::transport::{self, Transport};

const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_DELAY: Duration = Duration::ZERO;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3500);

/// Suspends the current task.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by [`tokio::time::sleep`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay between consecutive rate limited attempts.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Wait the same duration before every retry.
    Fixed(Duration),
    /// Start at `initial` and multiply by `multiplier` after every retry, never exceeding `max`.
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed(DEFAULT_RETRY_DELAY)
    }
}

impl Backoff {
    fn schedule(&self) -> Schedule {
        match self {
            Backoff::Fixed(delay) => Schedule::Fixed(*delay),
            Backoff::Exponential {
                initial,
                max,
                multiplier,
            } => Schedule::Exponential {
                backoff: ExponentialBackoffBuilder::default()
                    .with_initial_interval(*initial)
                    .with_max_interval(*max)
                    .with_multiplier(*multiplier)
                    .with_randomization_factor(0.0)
                    .with_max_elapsed_time(None) // Attempts are capped by RetryConfig instead
                    .build(),
                max: *max,
            },
        }
    }
}

enum Schedule {
    Fixed(Duration),
    Exponential {
        backoff: ExponentialBackoff,
        max: Duration,
    },
}

impl Schedule {
    fn next_delay(&mut self) -> Duration {
        match self {
            Schedule::Fixed(delay) => *delay,
            Schedule::Exponential { backoff, max } => backoff.next_backoff().unwrap_or(*max),
        }
    }
}

/// Configuration of the [`Retrier`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of requests sent for one call, the first one included. Once every one of
    /// them was rate limited, the call fails with [`crate::error::Kind::RateLimitExhausted`].
    pub max_attempts: u32,
    /// Delay before the first attempt. A zero delay does not touch the [`Clock`].
    pub initial_delay: Duration,
    /// Delay policy applied after each `429`.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff,
        }
    }
}

/// Sends a signed `GET` until it is no longer rate limited.
#[derive(Clone, Debug, Default)]
pub struct Retrier {
    config: RetryConfig,
}

impl Retrier {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Sends the request, retrying on `429`.
    ///
    /// * `200`: the envelope is returned as is.
    /// * `429`: waits for the next backoff delay and sends the same request again, until
    ///   [`RetryConfig::max_attempts`] requests have been sent.
    /// * anything else: a degraded envelope with an empty array as data. Status and headers are
    ///   kept and [`Envelope::error`] describes the status.
    pub async fn execute<T, C>(
        &self,
        transport: &T,
        clock: &C,
        url: &Url,
        credentials: &Credentials,
        signature: &str,
    ) -> Result<Envelope>
    where
        T: Transport + ?Sized,
        C: Clock + ?Sized,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut schedule = self.config.backoff.schedule();
        let mut delay = self.config.initial_delay;
        let mut attempts = 0_u32;

        loop {
            if !delay.is_zero() {
                clock.sleep(delay).await;
            }
            attempts += 1;

            let envelope = transport::fetch(
                transport,
                Method::GET,
                url.clone(),
                credentials,
                signature,
                None::<&()>,
            )
            .await?;

            match envelope.status {
                StatusCode::OK => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempts, path = url.path(), "successful call");

                    return Ok(envelope);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempts >= max_attempts {
                        #[cfg(feature = "tracing")]
                        tracing::error!(
                            attempts,
                            path = url.path(),
                            "rate limit retries exhausted"
                        );

                        return Err(Error::rate_limit_exhausted(attempts, url.path().to_owned()));
                    }

                    delay = schedule.next_delay();

                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        path = url.path(),
                        "rate limited, retrying"
                    );
                }
                _ => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        status = envelope.status.as_u16(),
                        path = url.path(),
                        "unexpected status, returning empty data"
                    );

                    return Ok(envelope.degraded());
                }
            }
        }
    }
}
