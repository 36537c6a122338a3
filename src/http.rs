//! Shared HTTP plumbing for the upstream REST clients

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to an upstream REST service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no reference pathway found matching '{0}'")]
    PathwayNotFound(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Build the reqwest client shared by all upstream clients
pub fn build_client(timeout: Duration) -> UpstreamResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(UpstreamError::Client)
}

/// Join a base URL and a path, tolerating a trailing slash on the base.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send a prepared request and fail on non-success statuses.
pub async fn send_checked(
    request: reqwest::RequestBuilder,
    url: &str,
) -> UpstreamResult<reqwest::Response> {
    let response = request.send().await.map_err(|source| UpstreamError::Request {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(response)
}

/// GET a URL and return its body as text.
pub async fn get_text(client: &reqwest::Client, url: &str) -> UpstreamResult<String> {
    let response = send_checked(client.get(url), url).await?;
    response.text().await.map_err(|source| UpstreamError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Decode a JSON body, attributing failures to `url`.
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
) -> UpstreamResult<T> {
    response.json().await.map_err(|source| UpstreamError::Decode {
        url: url.to_string(),
        source,
    })
}
