//! HTTP retrieval of raw feed bytes

use crate::config::DEFAULT_TIMEOUT;
use crate::config::USER_AGENT;
use crate::error::FetchError;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Upper bound on time spent discarding the body of a non-200 response
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on bytes read while discarding the body of a non-200 response.
/// Past this the connection is dropped instead of reused.
const DRAIN_LIMIT: usize = 64 * 1024;

/// Parameters for one GET
#[derive(Clone, Copy, Debug)]
pub struct FetchRequest<'a> {
    /// Endpoint to GET
    pub url: &'a str,
    /// Client to send with; `None` builds one for this call only
    pub client: Option<&'a reqwest::Client>,
    /// Timeout for a client built by this call (ignored when `client` is set)
    pub timeout: Duration,
    /// `User-Agent` header value
    pub user_agent: &'a str,
}

impl<'a> FetchRequest<'a> {
    /// Request for `url` with the default timeout and user agent
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            client: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT,
        }
    }

    /// Send with a caller-supplied client
    pub fn client(mut self, client: &'a reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }
}

/// GET `request.url` and return the full body of a 200 response
///
/// The request carries `Accept: application/json` and the configured
/// `User-Agent`. Cancelling `cancel` aborts the wait for headers or body and
/// yields [`FetchError::Cancelled`].
///
/// # Errors
/// - [`FetchError::InvalidUrl`] / [`FetchError::BuildRequest`] before anything is sent
/// - [`FetchError::Transport`] / [`FetchError::Cancelled`] while waiting for the response
/// - [`FetchError::UnexpectedStatus`] for any status other than 200
/// - [`FetchError::ReadBody`] if the body stream fails after the headers arrived
pub async fn fetch_bytes(
    cancel: &CancellationToken,
    request: FetchRequest<'_>,
) -> Result<Bytes, FetchError> {
    let url = request.url;
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let owned_client;
    let client = match request.client {
        Some(client) => client,
        None => {
            owned_client = reqwest::Client::builder()
                .timeout(request.timeout)
                .build()
                .map_err(|source| FetchError::BuildRequest {
                    url: url.to_string(),
                    source,
                })?;
            &owned_client
        }
    };

    let http_request = client
        .get(parsed)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT_HEADER, request.user_agent)
        .build()
        .map_err(|source| FetchError::BuildRequest {
            url: url.to_string(),
            source,
        })?;

    debug!(url, "Fetching feed");

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(url, "Feed request cancelled before response");
            return Err(FetchError::Cancelled { url: url.to_string() });
        }
        result = client.execute(http_request) => result.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            timed_out: source.is_timeout(),
            source,
        })?,
    };

    let status = response.status();
    debug!(url, status = status.as_u16(), "Feed response received");

    if status != StatusCode::OK {
        release_body(cancel, url, response).await;
        return Err(FetchError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(url, "Feed request cancelled while reading body");
            return Err(FetchError::Cancelled { url: url.to_string() });
        }
        body = response.bytes() => body.map_err(|source| FetchError::ReadBody {
            url: url.to_string(),
            source,
        })?,
    };

    debug!(url, bytes = body.len(), "Feed body read");
    Ok(body)
}

/// Discard an unwanted response body so the connection can be reused.
/// Reads at most [`DRAIN_LIMIT`] bytes within [`DRAIN_TIMEOUT`]; failures are
/// logged and never surface to the caller.
async fn release_body(cancel: &CancellationToken, url: &str, mut response: reqwest::Response) {
    let drain = async {
        let mut discarded = 0usize;
        while discarded < DRAIN_LIMIT {
            match response.chunk().await? {
                Some(chunk) => discarded += chunk.len(),
                None => return Ok(Some(discarded)),
            }
        }
        Ok::<_, reqwest::Error>(None)
    };

    let drained = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        drained = tokio::time::timeout(DRAIN_TIMEOUT, drain) => drained,
    };

    match drained {
        Ok(Ok(Some(bytes))) => debug!(url, bytes, "Discarded error response body"),
        Ok(Ok(None)) => debug!(
            url,
            limit = DRAIN_LIMIT,
            "Error response body over drain limit, dropping connection"
        ),
        Ok(Err(e)) => warn!(url, error = %e, "Failed to release response body"),
        Err(_) => warn!(
            url,
            timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "Timed out releasing response body"
        ),
    }
}
