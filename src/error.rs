//! Error types for sofafeed
//!
//! Errors are split by the pipeline stage that produced them:
//! - [`Error::UnknownFeedKind`] / [`Error::Config`] - caller misconfiguration
//! - [`FetchError`] - building, sending or reading the HTTP request
//! - [`DecodeError`] - turning the response bytes into a typed feed
//!
//! Every variant exposes a machine-readable [`Error::error_code`] so callers can
//! branch on the failure class without matching on message text.

use thiserror::Error;

/// Result type alias for sofafeed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sofafeed
#[derive(Debug, Error)]
pub enum Error {
    /// The feed discriminator did not name a known feed variant
    #[error("unknown feed kind '{kind}' (expected 'macos' or 'ios')")]
    UnknownFeedKind {
        /// The discriminator value supplied by the caller
        kind: String,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "macos_url")
        key: Option<String>,
    },

    /// Retrieving the feed over HTTP failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The retrieved bytes could not be decoded into a feed
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Pipeline stage that produced an [`Error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Selecting the feed variant and its configuration
    Select,
    /// Network retrieval
    Fetch,
    /// JSON decoding
    Decode,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Select => "select",
            Stage::Fetch => "fetch",
            Stage::Decode => "decode",
        })
    }
}

/// HTTP retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL could not be parsed
    #[error("invalid feed URL '{url}': {source}")]
    InvalidUrl {
        /// The URL as supplied
        url: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client or request could not be constructed
    #[error("failed to build request for '{url}': {source}")]
    BuildRequest {
        /// The target URL
        url: String,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// The request failed at the transport level (connect, TLS, timeout)
    #[error("request to '{url}' failed: {source}")]
    Transport {
        /// The target URL
        url: String,
        /// Whether the failure was a timeout
        timed_out: bool,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// The caller cancelled the request while it was in flight
    #[error("request to '{url}' was cancelled")]
    Cancelled {
        /// The target URL
        url: String,
    },

    /// The server answered with something other than 200 OK
    #[error("unexpected HTTP status {status} from '{url}'")]
    UnexpectedStatus {
        /// The target URL
        url: String,
        /// The numeric status code returned by the server
        status: u16,
    },

    /// The response headers arrived but the body could not be read
    #[error("failed to read response body from '{url}': {source}")]
    ReadBody {
        /// The target URL
        url: String,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status carried by [`FetchError::UnexpectedStatus`]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures that happened before any request left the process
    pub fn is_request_construction(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidUrl { .. } | FetchError::BuildRequest { .. }
        )
    }

    /// True for network-level failures, including timeouts and cancellation
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Transport { .. } | FetchError::Cancelled { .. }
        )
    }
}

/// Feed decoding errors
///
/// Line and column are 1-based positions reported by `serde_json`; they refer to
/// the point where the decoder gave up, which for flattened platform sections
/// may be the end of the enclosing object.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input was empty or whitespace only
    #[error("feed document is empty")]
    Empty,

    /// The input is not well-formed JSON (including truncated input)
    #[error("malformed JSON at line {line}, column {column}: {source}")]
    Syntax {
        /// Line of the failure
        line: usize,
        /// Column of the failure
        column: usize,
        /// Underlying serde_json error
        #[source]
        source: serde_json::Error,
    },

    /// A date-time field held a value that is not an RFC 3339 timestamp
    #[error("invalid timestamp at line {line}, column {column}: {source}")]
    InvalidTimestamp {
        /// Line of the failure
        line: usize,
        /// Column of the failure
        column: usize,
        /// Underlying serde_json error
        #[source]
        source: serde_json::Error,
    },

    /// A JSON value has a type incompatible with its target field
    #[error("feed does not match schema at line {line}, column {column}: {source}")]
    Schema {
        /// Line of the failure
        line: usize,
        /// Column of the failure
        column: usize,
        /// Underlying serde_json error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// The pipeline stage this error originated in
    pub fn stage(&self) -> Stage {
        match self {
            Error::UnknownFeedKind { .. } | Error::Config { .. } => Stage::Select,
            Error::Fetch(_) => Stage::Fetch,
            Error::Decode(_) => Stage::Decode,
        }
    }

    /// Machine-readable error code (snake_case), stable across releases
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::UnknownFeedKind { .. } => "unknown_feed_kind",
            Error::Config { .. } => "config_error",
            Error::Fetch(e) => e.error_code(),
            Error::Decode(e) => e.error_code(),
        }
    }

    /// True when the error is a caller misconfiguration rather than a runtime failure
    pub fn is_config(&self) -> bool {
        self.stage() == Stage::Select
    }
}

impl FetchError {
    /// Machine-readable error code (snake_case)
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::BuildRequest { .. } => "build_request_failed",
            FetchError::Transport { .. } => "transport_failed",
            FetchError::Cancelled { .. } => "cancelled",
            FetchError::UnexpectedStatus { .. } => "unexpected_status",
            FetchError::ReadBody { .. } => "read_body_failed",
        }
    }
}

impl DecodeError {
    /// Machine-readable error code (snake_case)
    pub fn error_code(&self) -> &'static str {
        match self {
            DecodeError::Empty => "empty_document",
            DecodeError::Syntax { .. } => "malformed_json",
            DecodeError::InvalidTimestamp { .. } => "invalid_timestamp",
            DecodeError::Schema { .. } => "schema_mismatch",
        }
    }
}
