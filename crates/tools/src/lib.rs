//! Helpers the bot calls on a learner's behalf.
//!
//! The calculator is pure and synchronous. The lookups implement
//! `nova_core::Lookup` and talk to public, keyless endpoints: Wikipedia for
//! encyclopedia summaries and DuckDuckGo for web and video results.

pub mod calculator;
pub mod encyclopedia;
pub mod video_search;
pub mod web_search;

pub use calculator::{calculate, calculate_message, CalcError, Calculation};
pub use encyclopedia::WikipediaLookup;
pub use video_search::DuckDuckGoVideoSearch;
pub use web_search::DuckDuckGoWebSearch;

use nova_core::error::LookupError;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("nova/", env!("CARGO_PKG_VERSION"), " (educational chat bot)");

/// HTTP client shared by the lookups. Wikipedia rejects anonymous agents.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) fn map_transport_error(e: reqwest::Error, timeout: Duration) -> LookupError {
    if e.is_timeout() {
        LookupError::Timeout(timeout.as_secs())
    } else {
        LookupError::Network(e.to_string())
    }
}

/// Send `request` and decode a JSON body, naming `service` in errors.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    service: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<T, LookupError> {
    let body = fetch_text(service, request, timeout).await?;
    serde_json::from_str(&body).map_err(|e| LookupError::Parse {
        service: service.into(),
        reason: e.to_string(),
    })
}

pub(crate) async fn fetch_text(
    service: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<String, LookupError> {
    let response = request
        .send()
        .await
        .map_err(|e| map_transport_error(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Http {
            service: service.into(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| map_transport_error(e, timeout))
}
