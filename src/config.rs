//! Configuration types for sofafeed

use crate::error::{Error, Result};
use crate::kind::{FeedKind, IOS_FEED_URL, MACOS_FEED_URL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout applied when no preconfigured client is supplied (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request, `sofafeed/<crate version>`
pub const USER_AGENT: &str = concat!("sofafeed/", env!("CARGO_PKG_VERSION"));

/// Endpoint and transport settings
///
/// Every field has a default, so an empty JSON object (or
/// [`FeedConfig::default()`]) yields the published endpoints and a 30 second
/// timeout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// macOS feed endpoint
    #[serde(default = "default_macos_url")]
    pub macos_url: String,

    /// iOS feed endpoint
    #[serde(default = "default_ios_url")]
    pub ios_url: String,

    /// Whole-request timeout used for clients built from this config (default: 30s)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            macos_url: default_macos_url(),
            ios_url: default_ios_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    /// Endpoint configured for the given kind
    pub fn url_for(&self, kind: FeedKind) -> &str {
        match kind {
            FeedKind::MacOS => &self.macos_url,
            FeedKind::Ios => &self.ios_url,
        }
    }

    /// Check that the endpoints parse and the timeout is usable
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("macos_url", &self.macos_url), ("ios_url", &self.ios_url)] {
            url::Url::parse(value).map_err(|e| Error::Config {
                message: format!("{key} '{value}' is not a valid URL: {e}"),
                key: Some(key.to_string()),
            })?;
        }

        if self.timeout.is_zero() {
            return Err(Error::Config {
                message: "timeout must be greater than zero".to_string(),
                key: Some("timeout".to_string()),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config {
                message: "user_agent must not be empty".to_string(),
                key: Some("user_agent".to_string()),
            });
        }

        Ok(())
    }

    /// Build a client with this config's timeout and user agent
    ///
    /// # Errors
    /// Returns the reqwest error if the TLS backend cannot be initialised.
    pub fn build_client(&self) -> std::result::Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
    }
}

/// Per-call overrides for a fetch
///
/// Both fields fall back to the active [`FeedConfig`]: a missing client means a
/// fresh client is built for this call only, a missing URL means the configured
/// endpoint for the requested kind.
#[derive(Clone, Debug, Default)]
pub struct FetchArgs {
    /// Preconfigured client (timeouts, proxies, TLS) to use instead of a fresh one
    pub client: Option<reqwest::Client>,

    /// Endpoint override
    pub url: Option<String>,
}

impl FetchArgs {
    /// Args that only override the endpoint
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: None,
            url: Some(url.into()),
        }
    }

    /// Args that only supply a client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Some(client),
            url: None,
        }
    }
}

fn default_macos_url() -> String {
    MACOS_FEED_URL.to_string()
}

fn default_ios_url() -> String {
    IOS_FEED_URL.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
