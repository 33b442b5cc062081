use std::fmt::Write as _;

use hmac::{Hmac, Mac as _};
use reqwest::header::HeaderMap;
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;

use crate::Result;
use crate::error::Error;

pub const API_KEY_VAR: &str = "THREECOMMAS_API_KEY";
pub const API_SECRET_VAR: &str = "THREECOMMAS_API_SECRET";

/// Every signed path starts with this prefix, and the prefix is part of the signed message.
pub const API_PREFIX: &str = "/public/api";

pub(crate) const APIKEY: &str = "APIKEY";
pub(crate) const SIGNATURE: &str = "Signature";

/// The API key and secret of a 3Commas account. Both are required for every call; the secret is
/// used to compute the `Signature` header (see [`signature`]) and never appears in `Debug` output.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(alias = "apikey", alias = "api_key")]
    pub(crate) key: String,
    #[serde(alias = "apisecret", alias = "api_secret")]
    pub(crate) secret: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(key: String, secret: String) -> Self {
        Self {
            key,
            secret: SecretString::from(secret),
        }
    }

    /// Reads credentials from [`API_KEY_VAR`] and [`API_SECRET_VAR`].
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_VAR)
            .map_err(|e| Error::validation(format!("{API_KEY_VAR} is not set: {e}")))?;
        let secret = std::env::var(API_SECRET_VAR)
            .map_err(|e| Error::validation(format!("{API_SECRET_VAR} is not set: {e}")))?;

        Ok(Self::new(key, secret))
    }

    /// Returns the API key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the secret.
    #[must_use]
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() || self.secret.expose_secret().trim().is_empty() {
            return Err(Error::validation(
                "Missing API keys. Credentials must carry both an API key and an API secret",
            ));
        }

        Ok(())
    }
}

/// One `limit`/`offset` window of a paginated listing.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    #[must_use]
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// Builds the message that gets signed, which is also the path and query of the request URL:
///
/// `/public/api{endpoint}?api_key={key}&secret={secret}[&limit={limit}&offset={offset}]{params}`
///
/// `params` is appended verbatim when it already starts with `&`; otherwise a `&` is inserted.
#[must_use]
pub fn query_string(
    endpoint: &str,
    credentials: &Credentials,
    page: Option<Page>,
    params: &str,
) -> String {
    let mut query = format!(
        "{API_PREFIX}{endpoint}?api_key={}&secret={}",
        credentials.key,
        credentials.secret.expose_secret()
    );

    if let Some(page) = page {
        let _ = write!(query, "&limit={}&offset={}", page.limit, page.offset);
    }

    if !params.is_empty() {
        if !params.starts_with('&') {
            query.push('&');
        }
        query.push_str(params);
    }

    query
}

/// Lowercase hex HMAC-SHA256 of `message`, keyed with the raw bytes of `secret`. 3Commas
/// recomputes this value server side, so it must be two zero-padded digits per byte.
pub fn signature(message: &str, secret: &SecretString) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())?;
    mac.update(message.as_bytes());

    let result = mac.finalize().into_bytes();
    Ok(hex::encode(result))
}

/// Returns the [`HeaderMap`] carrying the `APIKEY` and `Signature` headers.
pub(crate) fn create_headers(credentials: &Credentials, signature: &str) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();

    map.insert(APIKEY, credentials.key.parse()?);
    map.insert(SIGNATURE, signature.parse()?);

    Ok(map)
}
