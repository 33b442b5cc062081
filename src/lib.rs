#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod client;
pub mod error;
pub mod response;
pub mod retry;
pub(crate) mod serde_helpers;
pub mod transport;
pub mod types;

use serde::Serialize;

pub use crate::client::{ApiRequest, Client, Config, Output};
use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Trait for converting request types to the extra query parameters of a 3Commas call.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string.
pub trait ToQueryParams: Serialize {
    /// Converts the request to extra query parameters.
    ///
    /// Returns an empty string if no parameters are set, otherwise returns a string starting
    /// with `&`, ready to be appended after the credentials and the `limit`/`offset` window.
    fn extra_params(&self) -> String {
        let params = serde_html_form::to_string(self)
            .inspect_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Unable to convert to URL-encoded string {e:?}");
                #[cfg(not(feature = "tracing"))]
                let _: &serde_html_form::ser::Error = e;
            })
            .unwrap_or_default();

        if params.is_empty() {
            String::new()
        } else {
            format!("&{params}")
        }
    }
}

impl<T: Serialize> ToQueryParams for T {}
