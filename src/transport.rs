//! The seam between the client and the network.
//!
//! [`Transport`] sends one HTTP request and hands back the status, headers and body text.
//! [`HttpTransport`] is the `reqwest` implementation; tests substitute their own.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method, Request, StatusCode};
use serde::Serialize;
use url::Url;

use crate::Result;
use crate::auth::{self, Credentials};
use crate::response::Envelope;

/// Status, headers and body of one HTTP exchange.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

/// Sends a fully built request.
///
/// Failures below HTTP (DNS, TLS, connection reset, timeouts) are returned as errors; any HTTP
/// status, including `4xx` and `5xx`, is a successful [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<RawResponse>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("threecommas_client"));
        headers.insert("Accept", HeaderValue::from_static("*/*"));
        headers.insert("Connection", HeaderValue::from_static("keep-alive"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one configured with a proxy or timeouts.
    #[must_use]
    pub fn with_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<RawResponse> {
        let response = self.client.execute(request).await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Whether a JSON payload is attached for `method`.
pub(crate) fn carries_payload(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PATCH
}

/// Builds the signed request for `url` and classifies the response into an [`Envelope`].
///
/// A payload is only serialized into the body for `POST` and `PATCH`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(transport, method, url, credentials, signature, payload),
        fields(method = %method, path = url.path(), status_code)
    )
)]
pub async fn fetch<T, P>(
    transport: &T,
    method: Method,
    url: Url,
    credentials: &Credentials,
    signature: &str,
    payload: Option<&P>,
) -> Result<Envelope>
where
    T: Transport + ?Sized,
    P: Serialize + ?Sized,
{
    let mut request = Request::new(method.clone(), url);
    *request.headers_mut() = auth::create_headers(credentials, signature)?;

    if let Some(payload) = payload.filter(|_| carries_payload(&method)) {
        *request.body_mut() = Some(serde_json::to_vec(payload)?.into());
    }

    let raw = transport.send(request).await?;

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", raw.status.as_u16());

    Ok(Envelope::from_raw(raw))
}
