//! Shared HTTP client construction

use crate::domain::{PublisherError, Result};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;

/// Connect timeout applied to every outbound client
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build a client with a whole-request timeout
pub fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_seconds.max(1))))
        .user_agent(concat!("release-publisher/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PublisherError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Turn a non-success response into an error message with its body
pub async fn error_for_status(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(format!("request failed with status {status}: {body}"))
}

/// Join a base URL and a path without doubling or dropping slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
