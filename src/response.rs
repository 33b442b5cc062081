//! The normalized `{data, status, headers, error}` envelope returned by single calls.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Result;
use crate::error::Error;
use crate::transport::RawResponse;

pub const INVALID_JSON_MESSAGE: &str =
    "Invalid JSON object was returned. Check to make sure your endpoint is correct.";

/// Status codes 3Commas uses for successful calls. It also answers `200` for some invalid
/// endpoints, which is why bodies are checked for JSON on top of the status.
pub(crate) const SUCCESS_CODES: [StatusCode; 3] =
    [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

/// Body of an [`Envelope`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// A JSON object or array.
    Json(Value),
    /// The raw body, kept when it is not a JSON object or array.
    Text(String),
}

impl Data {
    /// Parses `body` when it holds a JSON object or array. Scalars such as `"ok"` or `1` are
    /// rejected along with non-JSON text.
    pub(crate) fn parse(body: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(body) {
            Ok(value) if value.is_object() || value.is_array() => Some(Data::Json(value)),
            _ => None,
        }
    }

    pub(crate) fn empty() -> Self {
        Data::Json(Value::Array(Vec::new()))
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Data::Json(value) => Some(value),
            Data::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Data::Json(_) => None,
            Data::Text(text) => Some(text),
        }
    }

    /// Returns the records when the body is a JSON array.
    #[must_use]
    pub fn records(&self) -> Option<&[Value]> {
        self.as_json()
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Consumes the body, returning its records when it is a JSON array.
    #[must_use]
    pub fn into_records(self) -> Option<Vec<Value>> {
        match self {
            Data::Json(Value::Array(records)) => Some(records),
            _ => None,
        }
    }
}

/// Result of one signed call.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Envelope {
    pub data: Data,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Set when a success status came back with a body that is not a JSON object or array, or
    /// when the retrier replaced the body of an unexpected status.
    pub error: Option<String>,
}

impl Envelope {
    /// Classifies a raw response:
    ///
    /// * `200`, `201`, `204`: the body is parsed as JSON. If that fails, [`Self::error`] is set
    ///   and [`Self::data`] keeps the raw text.
    /// * `429`: the body is replaced with an empty array.
    /// * anything else: returned untouched, with the raw text as data.
    #[must_use]
    pub fn from_raw(raw: RawResponse) -> Self {
        let RawResponse {
            status,
            headers,
            body,
        } = raw;

        #[cfg(feature = "tracing")]
        tracing::info!(status = status.as_u16(), "Response Code");

        if SUCCESS_CODES.contains(&status) {
            return match Data::parse(&body) {
                Some(data) => Self {
                    data,
                    status,
                    headers,
                    error: None,
                },
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(status = status.as_u16(), "{INVALID_JSON_MESSAGE}");

                    Self {
                        data: Data::Text(body),
                        status,
                        headers,
                        error: Some(INVALID_JSON_MESSAGE.to_owned()),
                    }
                }
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            #[cfg(feature = "tracing")]
            tracing::error!("429 error - You are rate limited.");

            return Self {
                data: Data::empty(),
                status,
                headers,
                error: None,
            };
        }

        #[cfg(feature = "tracing")]
        tracing::error!(status = status.as_u16(), "Unknown error");

        Self {
            data: Data::Text(body),
            status,
            headers,
            error: None,
        }
    }

    /// Replacement the retrier hands back for a status that is neither `200` nor `429`: the
    /// body is dropped, status and headers are kept.
    pub(crate) fn degraded(self) -> Self {
        let error = self
            .error
            .unwrap_or_else(|| format!("Unexpected status code: {}", self.status));

        Self {
            data: Data::empty(),
            status: self.status,
            headers: self.headers,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        SUCCESS_CODES.contains(&self.status) && self.error.is_none()
    }

    /// Decodes [`Self::data`] into `T`.
    ///
    /// Fails when the body was not JSON or does not match the shape of `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.data {
            Data::Json(value) => crate::serde_helpers::deserialize_with_warnings(value.clone()),
            Data::Text(_) => Err(Error::validation(
                self.error
                    .clone()
                    .unwrap_or_else(|| INVALID_JSON_MESSAGE.to_owned()),
            )),
        }
    }
}

/// Decodes the records of a paginated listing into `T`.
pub fn decode_records<T: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<T>> {
    crate::serde_helpers::deserialize_with_warnings(Value::Array(records))
}
