//! Client for the 3Commas public REST API.
//!
//! Every call is signed: the path and query string (which carries the API key and secret) is
//! run through HMAC-SHA256 and sent in the `Signature` header together with the `APIKEY` header.
//!
//! # Example
//!
//! ```no_run
//! use threecommas_client::Client;
//! use threecommas_client::auth::Credentials;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::default();
//! let credentials = Credentials::from_env()?;
//!
//! // One signed call, returning the full envelope
//! let accounts = client.get(&credentials, "/ver1/accounts", "").await?;
//! println!("{}: {:?}", accounts.status, accounts.data);
//!
//! // Every enabled bot, 1000 records per page
//! let bots = client
//!     .get_all(&credentials, "/ver1/bots", "&scope=enabled", None)
//!     .await?;
//! println!("{} bots", bots.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_stream::try_stream;
use bon::Builder;
use futures::{Stream, TryStreamExt as _};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth::{self, API_PREFIX, Credentials, Page};
use crate::error::Error;
use crate::response::{self, Data, Envelope};
use crate::retry::{Clock, Retrier, RetryConfig, TokioClock};
use crate::transport::{self, HttpTransport, Transport};
use crate::types::BotAction;
use crate::types::request::{BotsRequest, DealsRequest};
use crate::types::response::{Account, Bot, Deal};
use crate::{Result, ToQueryParams as _};

/// The production API host.
pub const DEFAULT_HOST: &str = "https://api.3commas.io";

/// Number of records requested per page. This is the maximum 3Commas serves in one call.
pub const PAGE_SIZE: u32 = 1000;

/// Offset at which pagination stops when no limit is given. A listing holding more than this
/// many records is truncated; pass a higher limit to [`Client::get_all`] to read further.
pub const DEFAULT_OFFSET_CEILING: u32 = 2000;

/// Configuration for [`Client`]
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Paginated listings stop requesting pages once the offset reaches this value, unless a
    /// limit is passed explicitly. Defaults to [`DEFAULT_OFFSET_CEILING`].
    #[builder(default = DEFAULT_OFFSET_CEILING)]
    pub offset_ceiling: u32,
    /// Rate-limit retry policy used by paginated listings.
    #[builder(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

/// Description of one call, as accepted by [`Client::call`].
///
/// # Example
///
/// ```
/// use threecommas_client::client::ApiRequest;
///
/// let request = ApiRequest::builder()
///     .endpoint("/ver1/deals")
///     .params("&scope=active")
///     .paginate(true)
///     .limit(5000)
///     .build();
/// ```
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct ApiRequest {
    #[builder(default = Method::GET)]
    pub method: Method,
    /// Path below `/public/api`, e.g. `/ver1/bots`.
    #[builder(into)]
    pub endpoint: String,
    /// Extra query parameters, formatted as `&key=value&...`.
    #[builder(into, default)]
    pub params: String,
    /// JSON body, only sent with `POST` and `PATCH`.
    pub payload: Option<Value>,
    /// Read every page of a `GET` listing instead of a single response.
    #[builder(default)]
    pub paginate: bool,
    /// Offset ceiling for this call when paginating. `None` or `0` falls back to
    /// [`Config::offset_ceiling`].
    pub limit: Option<u32>,
}

/// What [`Client::call`] produced.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum Output {
    /// Result of a single call.
    Envelope(Envelope),
    /// Records of every page of a paginated listing.
    Records(Vec<Value>),
}

impl Output {
    #[must_use]
    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            Output::Envelope(envelope) => Some(envelope),
            Output::Records(_) => None,
        }
    }

    #[must_use]
    pub fn into_records(self) -> Option<Vec<Value>> {
        match self {
            Output::Envelope(_) => None,
            Output::Records(records) => Some(records),
        }
    }
}

#[derive(Debug)]
struct ClientInner<T: ?Sized, C: ?Sized> {
    host: Url,
    config: Config,
    retrier: Retrier,
    clock: Arc<C>,
    transport: Arc<T>,
}

/// HTTP client for the 3Commas API.
///
/// Credentials are passed to every call rather than held by the client, so one client can serve
/// several accounts.
///
/// The network and the clock used for rate-limit delays are pluggable through
/// [`Client::with_transport`].
#[derive(Debug)]
pub struct Client<T: ?Sized = HttpTransport, C: ?Sized = TokioClock> {
    inner: Arc<ClientInner<T, C>>,
}

impl<T: ?Sized, C: ?Sized> Clone for Client<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new(DEFAULT_HOST, Config::default())
            .expect("Client with default endpoint should succeed")
    }
}

impl Client {
    /// Creates a client for `host` using [`HttpTransport`] and [`TokioClock`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(host: &str, config: Config) -> Result<Client> {
        Client::with_transport(
            host,
            config,
            Arc::new(HttpTransport::new()?),
            Arc::new(TokioClock),
        )
    }
}

impl<T, C> Client<T, C>
where
    T: Transport + ?Sized,
    C: Clock + ?Sized,
{
    pub fn with_transport(
        host: &str,
        config: Config,
        transport: Arc<T>,
        clock: Arc<C>,
    ) -> Result<Client<T, C>> {
        let retrier = Retrier::new(config.retry.clone());

        Ok(Self {
            inner: Arc::new(ClientInner {
                host: Url::parse(host)?,
                config,
                retrier,
                clock,
                transport,
            }),
        })
    }

    /// Returns the base URL of the API.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.inner.host
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Parses `query` against the host and signs the path and query as they go on the wire,
    /// after percent-encoding.
    fn signed_url(&self, credentials: &Credentials, query: &str) -> Result<(Url, String)> {
        let host = self.inner.host.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{host}{query}"))?;

        let wire = format!("{}?{}", url.path(), url.query().unwrap_or_default());
        let signature = auth::signature(&wire, credentials.secret())?;

        Ok((url, signature))
    }

    /// Validates and dispatches a call described by `request`:
    ///
    /// * paginated `GET`: [`Output::Records`] from [`Self::get_all`]
    /// * `GET`, `POST`, `PATCH`, `DELETE`: [`Output::Envelope`] from one signed call
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::Kind::Validation`] before anything is sent when the endpoint
    /// or the credentials are missing, when pagination is requested for a method other than
    /// `GET`, or when the method is not one of the four above.
    pub async fn call(&self, credentials: &Credentials, request: &ApiRequest) -> Result<Output> {
        validate(credentials, &request.endpoint, &request.params)?;

        let method = &request.method;
        if request.paginate {
            if *method != Method::GET {
                return Err(Error::validation(format!(
                    "Pagination is only supported for GET, got {method}"
                )));
            }

            return self
                .get_all(credentials, &request.endpoint, &request.params, request.limit)
                .await
                .map(Output::Records);
        }

        let envelope = if *method == Method::GET || *method == Method::DELETE {
            self.single(
                credentials,
                method.clone(),
                &request.endpoint,
                &request.params,
                None::<&Value>,
            )
            .await?
        } else if *method == Method::POST || *method == Method::PATCH {
            self.single(
                credentials,
                method.clone(),
                &request.endpoint,
                &request.params,
                request.payload.as_ref(),
            )
            .await?
        } else {
            return Err(Error::validation(format!(
                "Unsupported method {method}, expected GET, POST, PATCH or DELETE"
            )));
        };

        Ok(Output::Envelope(envelope))
    }

    /// One signed `GET`, returned as an [`Envelope`] whatever the status. `params` are extra
    /// query parameters formatted as `&key=value`.
    pub async fn get(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        params: &str,
    ) -> Result<Envelope> {
        self.single(credentials, Method::GET, endpoint, params, None::<&Value>)
            .await
    }

    /// One signed `POST`. `payload`, when given, is sent as the JSON body; several 3Commas
    /// `POST` endpoints take none.
    pub async fn post<P: Serialize + ?Sized>(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        params: &str,
        payload: Option<&P>,
    ) -> Result<Envelope> {
        self.single(credentials, Method::POST, endpoint, params, payload)
            .await
    }

    /// One signed `PATCH` with an optional JSON body.
    pub async fn patch<P: Serialize + ?Sized>(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        params: &str,
        payload: Option<&P>,
    ) -> Result<Envelope> {
        self.single(credentials, Method::PATCH, endpoint, params, payload)
            .await
    }

    /// One signed `DELETE`.
    pub async fn delete(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        params: &str,
    ) -> Result<Envelope> {
        self.single(credentials, Method::DELETE, endpoint, params, None::<&Value>)
            .await
    }

    async fn single<P: Serialize + ?Sized>(
        &self,
        credentials: &Credentials,
        method: Method,
        endpoint: &str,
        params: &str,
        payload: Option<&P>,
    ) -> Result<Envelope> {
        validate(credentials, endpoint, params)?;

        let query = auth::query_string(endpoint, credentials, None, params);
        let (url, signature) = self.signed_url(credentials, &query)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(method = %method, path = url.path(), "single call");

        transport::fetch(
            &*self.inner.transport,
            method,
            url,
            credentials,
            &signature,
            payload,
        )
        .await
    }

    /// Reads every page of a `GET` listing and returns the records of all pages, flattened.
    ///
    /// Pages of [`PAGE_SIZE`] records are requested at offsets `0`, `1000`, `2000`, ... while the
    /// offset is below `limit` (or [`Config::offset_ceiling`] when `None` or `0`). Reading stops
    /// early at the first page holding fewer than [`PAGE_SIZE`] records. A listing whose size is
    /// an exact multiple of [`PAGE_SIZE`] costs one extra, empty, request.
    ///
    /// Each page goes through the rate-limit [`Retrier`]. A page answered with an unexpected
    /// status contributes no records and ends the listing.
    pub async fn get_all(
        &self,
        credentials: &Credentials,
        endpoint: &str,
        params: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Value>> {
        let records: Vec<Value> = self
            .stream_records(credentials, endpoint, params, limit)
            .try_collect()
            .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(endpoint, records = records.len(), "Response data length");

        Ok(records)
    }

    /// Streaming form of [`Self::get_all`]: records are yielded page by page, and the next page
    /// is only requested once the previous one has been consumed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use futures::StreamExt as _;
    /// use threecommas_client::Client;
    /// use threecommas_client::auth::Credentials;
    /// use tokio::pin;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::default();
    /// let credentials = Credentials::from_env()?;
    ///
    /// let stream =
    ///     client.stream_records(&credentials, "/ver1/deals", "&scope=finished", Some(10_000));
    /// pin!(stream);
    ///
    /// while let Some(deal) = stream.next().await {
    ///     println!("{}", deal?["id"]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn stream_records<'client>(
        &'client self,
        credentials: &'client Credentials,
        endpoint: &'client str,
        params: &'client str,
        limit: Option<u32>,
    ) -> impl Stream<Item = Result<Value>> + 'client {
        let ceiling = limit
            .filter(|limit| *limit > 0)
            .unwrap_or(self.inner.config.offset_ceiling);

        try_stream! {
            validate(credentials, endpoint, params)?;

            let mut offset = 0;

            while offset < ceiling {
                let page = Page::new(PAGE_SIZE, offset);
                let query = auth::query_string(endpoint, credentials, Some(page), params);
                let (url, signature) = self.signed_url(credentials, &query)?;

                let envelope = self
                    .inner
                    .retrier
                    .execute(
                        &*self.inner.transport,
                        &*self.inner.clock,
                        &url,
                        credentials,
                        &signature,
                    )
                    .await?;

                #[cfg(feature = "tracing")]
                let status = envelope.status;

                let Some(records) = envelope.data.into_records() else {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        endpoint,
                        offset,
                        status = status.as_u16(),
                        "page is not a JSON array, stopping pagination"
                    );
                    break;
                };

                let count = records.len();

                #[cfg(feature = "tracing")]
                tracing::info!(
                    endpoint,
                    offset,
                    current_response = count,
                    status = status.as_u16(),
                    "page received"
                );

                for record in records {
                    yield record;
                }

                // A short page is the last one
                if count < PAGE_SIZE as usize {
                    break;
                }

                offset = offset.saturating_add(PAGE_SIZE);
            }
        }
    }

    /// Every bot matching `request`, across all pages up to [`Config::offset_ceiling`].
    pub async fn bots(&self, credentials: &Credentials, request: &BotsRequest) -> Result<Vec<Bot>> {
        let records = self
            .get_all(credentials, "/ver1/bots", &request.extra_params(), None)
            .await?;

        response::decode_records(records)
    }

    /// Every deal matching `request`, across all pages up to [`Config::offset_ceiling`].
    pub async fn deals(
        &self,
        credentials: &Credentials,
        request: &DealsRequest,
    ) -> Result<Vec<Deal>> {
        let records = self
            .get_all(credentials, "/ver1/deals", &request.extra_params(), None)
            .await?;

        response::decode_records(records)
    }

    /// The exchange accounts connected to 3Commas.
    ///
    /// # Errors
    ///
    /// Unlike [`Self::get`], a non-success response is returned as a
    /// [`crate::error::Kind::Status`] error.
    pub async fn accounts(&self, credentials: &Credentials) -> Result<Vec<Account>> {
        let endpoint = "/ver1/accounts";
        let envelope = self.get(credentials, endpoint, "").await?;

        require_success(envelope, Method::GET, endpoint)?.json()
    }

    /// Applies `action` to a bot and returns its updated state.
    pub async fn bot_action(
        &self,
        credentials: &Credentials,
        bot_id: i64,
        action: BotAction,
    ) -> Result<Bot> {
        let endpoint = format!("/ver1/bots/{bot_id}/{action}");
        let envelope = self
            .post(credentials, &endpoint, "", None::<&Value>)
            .await?;

        require_success(envelope, Method::POST, &endpoint)?.json()
    }
}

fn validate(credentials: &Credentials, endpoint: &str, params: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(Error::validation("Missing the method or endpoint."));
    }
    if !endpoint.starts_with('/') {
        return Err(Error::validation(format!(
            "Endpoint {endpoint} must start with '/', e.g. '/ver1/bots'"
        )));
    }
    if endpoint.contains('#') || params.contains('#') {
        return Err(Error::validation("Endpoint and params must not contain '#', encode it as %23"));
    }
    if endpoint.starts_with(API_PREFIX) {
        return Err(Error::validation(format!(
            "Endpoint {endpoint} must not include {API_PREFIX}, e.g. '/ver1/bots'"
        )));
    }

    credentials.validate()
}

fn require_success(envelope: Envelope, method: Method, endpoint: &str) -> Result<Envelope> {
    if envelope.is_success() {
        return Ok(envelope);
    }

    let message = match (&envelope.error, &envelope.data) {
        (Some(error), _) => error.clone(),
        (None, Data::Text(text)) => text.clone(),
        (None, Data::Json(value)) => value.to_string(),
    };

    Err(Error::status(
        envelope.status,
        method,
        format!("{API_PREFIX}{endpoint}"),
        message,
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::error::{Kind, Validation};
    use crate::retry::Backoff;
    use crate::retry::test_support::RecordingClock;
    use crate::transport::test_support::{ScriptedTransport, Sent, records};

    type TestClient = Client<ScriptedTransport, RecordingClock>;

    fn credentials() -> Credentials {
        Credentials::new("test-key".to_owned(), "test-secret".to_owned())
    }

    fn client_with(
        config: Config,
        responses: Vec<(StatusCode, String)>,
    ) -> (TestClient, Arc<ScriptedTransport>, Arc<RecordingClock>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let clock = Arc::new(RecordingClock::default());
        let client = Client::with_transport(
            DEFAULT_HOST,
            config,
            Arc::clone(&transport),
            Arc::clone(&clock),
        )
        .expect("static host");

        (client, transport, clock)
    }

    fn client(
        responses: Vec<(StatusCode, String)>,
    ) -> (TestClient, Arc<ScriptedTransport>, Arc<RecordingClock>) {
        client_with(Config::default(), responses)
    }

    #[tokio::test]
    async fn get_returns_parsed_envelope() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, r#"{"id":1}"#.to_owned())]);

        let envelope = client.get(&credentials(), "/ver1/accounts", "").await?;

        assert_eq!(envelope.data, Data::Json(json!({"id": 1})));
        assert!(envelope.error.is_none());

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].url.as_str(),
            "https://api.3commas.io/public/api/ver1/accounts?api_key=test-key&secret=test-secret"
        );
        assert_eq!(
            sent[0].headers["Signature"],
            "ccfedf5f16ee595cce14f4bac9d68bb8b801fa1acdccbf45f1aab2aa026bd39b"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_keeps_raw_text_for_invalid_json() -> anyhow::Result<()> {
        let (client, _, _) = client(vec![(StatusCode::OK, "not-json".to_owned())]);

        let envelope = client.get(&credentials(), "/ver1/bots", "").await?;

        assert_eq!(envelope.data, Data::Text("not-json".to_owned()));
        assert!(envelope.error.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn single_get_does_not_retry_rate_limits() -> anyhow::Result<()> {
        let (client, transport, clock) =
            client(vec![(StatusCode::TOO_MANY_REQUESTS, String::new())]);

        let envelope = client.get(&credentials(), "/ver1/bots", "").await?;

        assert_eq!(envelope.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(envelope.data, Data::Json(json!([])));
        assert_eq!(transport.sent().len(), 1);
        assert!(clock.delays().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn pagination_reads_until_short_page() -> anyhow::Result<()> {
        let config = Config::builder().offset_ceiling(10_000).build();
        let (client, transport, _) = client_with(
            config,
            vec![
                (StatusCode::OK, records(1000)),
                (StatusCode::OK, records(1000)),
                (StatusCode::OK, records(200)),
            ],
        );

        let records = client
            .get_all(&credentials(), "/ver1/deals", "", None)
            .await?;

        assert_eq!(records.len(), 2200);

        let offsets: Vec<_> = transport
            .sent()
            .iter()
            .map(|s| s.query_param("offset"))
            .collect();
        assert_eq!(
            offsets,
            vec![
                Some("0".to_owned()),
                Some("1000".to_owned()),
                Some("2000".to_owned())
            ]
        );
        assert!(
            transport
                .sent()
                .iter()
                .all(|s| s.query_param("limit").as_deref() == Some("1000"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn pagination_stops_at_default_ceiling() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, records(1000))]);

        let records = client
            .get_all(&credentials(), "/ver1/deals", "&scope=finished", None)
            .await?;

        assert_eq!(records.len(), 2000);

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].query_param("offset").as_deref(), Some("0"));
        assert_eq!(sent[1].query_param("offset").as_deref(), Some("1000"));
        assert!(
            sent.iter()
                .all(|s| s.query_param("scope").as_deref() == Some("finished"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn pagination_limit_overrides_ceiling() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, records(1000))]);

        let records = client
            .get_all(&credentials(), "/ver1/bots", "", Some(1000))
            .await?;

        assert_eq!(records.len(), 1000);
        assert_eq!(transport.sent().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn pagination_retries_rate_limited_page() -> anyhow::Result<()> {
        let (client, transport, clock) = client(vec![
            (StatusCode::TOO_MANY_REQUESTS, String::new()),
            (StatusCode::OK, records(3)),
        ]);

        let records = client
            .get_all(&credentials(), "/ver1/bots", "", None)
            .await?;

        assert_eq!(records.len(), 3);
        assert_eq!(transport.sent().len(), 2);
        assert_eq!(clock.delays(), vec![Duration::from_millis(3500)]);

        Ok(())
    }

    #[tokio::test]
    async fn pagination_fails_when_rate_limit_never_clears() {
        let config = Config::builder()
            .retry(RetryConfig::new(
                2,
                Duration::ZERO,
                Backoff::Fixed(Duration::from_millis(10)),
            ))
            .build();
        let (client, transport, _) =
            client_with(config, vec![(StatusCode::TOO_MANY_REQUESTS, String::new())]);

        let err = client
            .get_all(&credentials(), "/ver1/bots", "", None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::RateLimitExhausted);
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn pagination_keeps_records_before_unexpected_status() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![
            (StatusCode::OK, records(1000)),
            (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_owned()),
        ]);

        let records = client
            .get_all(&credentials(), "/ver1/deals", "", None)
            .await?;

        assert_eq!(records.len(), 1000);
        assert_eq!(transport.sent().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn pagination_stops_on_non_array_page() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(
            StatusCode::OK,
            r#"{"error":"record_not_found"}"#.to_owned(),
        )]);

        let records = client
            .get_all(&credentials(), "/ver1/deals", "", None)
            .await?;

        assert!(records.is_empty());
        assert_eq!(transport.sent().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn missing_secret_fails_before_network() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);
        let credentials = Credentials::new("test-key".to_owned(), String::new());
        let request = ApiRequest::builder().endpoint("/ver1/bots").build();

        let err = client.call(&credentials, &request).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(err.downcast_ref::<Validation>().is_some());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_endpoint_fails_before_network() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);
        let request = ApiRequest::builder().endpoint("").paginate(true).build();

        let err = client.call(&credentials(), &request).await.unwrap_err();

        let validation = err
            .downcast_ref::<Validation>()
            .expect("source should be Validation");
        assert_eq!(validation.reason, "Missing the method or endpoint.");
        assert!(transport.sent().is_empty());
    }

    fn wire_signature(sent: &Sent) -> anyhow::Result<String> {
        let wire = format!("{}?{}", sent.url.path(), sent.url.query().unwrap_or_default());

        Ok(auth::signature(&wire, credentials().secret())?)
    }

    #[tokio::test]
    async fn signature_covers_encoded_query() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);

        client
            .get(&credentials(), "/ver1/deals", "&note=a b")
            .await?;

        let sent = transport.sent();
        assert_eq!(
            sent[0].url.query(),
            Some("api_key=test-key&secret=test-secret&note=a%20b")
        );
        assert_eq!(sent[0].query_param("note").as_deref(), Some("a b"));
        assert_eq!(sent[0].headers["Signature"], wire_signature(&sent[0])?.as_str());

        Ok(())
    }

    #[tokio::test]
    async fn paged_signature_covers_encoded_query() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, records(2))]);

        client
            .get_all(&credentials(), "/ver1/deals", "&pair=USDT BTC", None)
            .await?;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].headers["Signature"], wire_signature(&sent[0])?.as_str());

        Ok(())
    }

    #[tokio::test]
    async fn fragment_in_params_is_rejected() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);

        let err = client
            .get(&credentials(), "/ver1/deals", "&label=#1&scope=active")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn zero_limit_uses_configured_ceiling() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, records(1000))]);

        let records = client
            .get_all(&credentials(), "/ver1/deals", "", Some(0))
            .await?;

        assert_eq!(records.len(), 2000);
        assert_eq!(transport.sent().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn endpoint_with_api_prefix_is_rejected() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);

        let err = client
            .get(&credentials(), "/public/api/ver1/bots", "")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn paginated_stream_validates_before_network() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);
        let credentials = Credentials::new(String::new(), "test-secret".to_owned());

        let err = client
            .get_all(&credentials, "/ver1/bots", "", None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn call_dispatches_paginated_get() -> anyhow::Result<()> {
        let (client, _, _) = client(vec![(StatusCode::OK, records(5))]);
        let request = ApiRequest::builder()
            .endpoint("/ver1/bots")
            .paginate(true)
            .build();

        let output = client.call(&credentials(), &request).await?;

        assert_eq!(output.into_records().map(|r| r.len()), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn call_dispatches_post_with_payload() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::CREATED, r#"{"id":7}"#.to_owned())]);
        let request = ApiRequest::builder()
            .method(Method::POST)
            .endpoint("/ver1/bots/create_bot")
            .payload(json!({"name": "grid"}))
            .build();

        let output = client.call(&credentials(), &request).await?;

        let envelope = output.into_envelope().expect("single call");
        assert_eq!(envelope.status, StatusCode::CREATED);

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::POST);
        let body = sent[0].body.clone().expect("payload should be sent");
        assert_eq!(serde_json::from_slice::<Value>(&body)?, json!({"name": "grid"}));

        Ok(())
    }

    #[tokio::test]
    async fn call_dispatches_delete_without_payload() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(StatusCode::OK, "{}".to_owned())]);
        let request = ApiRequest::builder()
            .method(Method::DELETE)
            .endpoint("/ver1/bots/7/delete")
            .payload(json!({"ignored": true}))
            .build();

        client.call(&credentials(), &request).await?;

        let sent = transport.sent();
        assert_eq!(sent[0].method, Method::DELETE);
        assert!(sent[0].body.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn call_rejects_pagination_for_post() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);
        let request = ApiRequest::builder()
            .method(Method::POST)
            .endpoint("/ver1/bots")
            .paginate(true)
            .build();

        let err = client.call(&credentials(), &request).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn call_rejects_unsupported_method() {
        let (client, transport, _) = client(vec![(StatusCode::OK, "[]".to_owned())]);
        let request = ApiRequest::builder()
            .method(Method::PUT)
            .endpoint("/ver1/bots")
            .build();

        let err = client.call(&credentials(), &request).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn accounts_turns_failure_into_status_error() {
        let (client, _, _) = client(vec![(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"signature_invalid"}"#.to_owned(),
        )]);

        let err = client.accounts(&credentials()).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        let status = err
            .downcast_ref::<crate::error::Status>()
            .expect("source should be Status");
        assert_eq!(status.status_code, StatusCode::UNAUTHORIZED);
        assert_eq!(status.path, "/public/api/ver1/accounts");
        assert_eq!(status.message, r#"{"error":"signature_invalid"}"#);
    }

    #[tokio::test]
    async fn bots_sends_typed_filters() -> anyhow::Result<()> {
        let (client, transport, _) = client(vec![(
            StatusCode::OK,
            json!([{
                "id": 1,
                "account_id": 2,
                "is_enabled": true,
                "name": "BTC long",
                "pairs": ["USDT_BTC"],
                "created_at": "2021-06-18T14:21:42.227Z",
                "updated_at": "2021-06-18T14:21:42.227Z"
            }])
            .to_string(),
        )]);
        let request = BotsRequest::builder()
            .scope(crate::types::BotScope::Enabled)
            .build();

        let bots = client.bots(&credentials(), &request).await?;

        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].name, "BTC long");
        assert_eq!(
            transport.sent()[0].query_param("scope").as_deref(),
            Some("enabled")
        );

        Ok(())
    }

    #[test]
    fn default_config_uses_explicit_ceiling() {
        let config = Config::default();

        assert_eq!(config.offset_ceiling, DEFAULT_OFFSET_CEILING);
        assert_eq!(config.retry, RetryConfig::default());
    }
}
