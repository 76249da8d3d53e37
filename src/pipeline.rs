//! Fetch-and-decode orchestration
//!
//! Each operation runs strictly in sequence: resolve the feed kind, fetch the
//! bytes, decode them. The first failure is returned, tagged by stage through
//! the [`Error`] variant it arrives in; decoding is never attempted after a
//! failed fetch.

use crate::config::{FeedConfig, FetchArgs};
use crate::decode::{decode, decode_kind};
use crate::error::{Error, Result};
use crate::fetch::{FetchRequest, fetch_bytes};
use crate::kind::IntoFeedKind;
use crate::model::{AnyFeed, Feed, Ios, IosFeed, MacOS, MacOSFeed, Platform};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Feed retrieval bound to one [`FeedConfig`]
///
/// Holds no per-call state: every call builds its own request and returns its
/// own document, so one `FeedFetcher` can serve concurrent callers. A client
/// set with [`FeedFetcher::with_client`] is shared by all calls; otherwise each
/// call without [`FetchArgs::client`] builds a fresh client with the configured
/// timeout.
#[derive(Clone, Debug, Default)]
pub struct FeedFetcher {
    config: FeedConfig,
    client: Option<reqwest::Client>,
}

impl FeedFetcher {
    /// Create a fetcher after validating `config`
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the config fails [`FeedConfig::validate`].
    pub fn new(config: FeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client: None,
        })
    }

    /// Share `client` across all calls made through this fetcher
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// The active configuration
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Fetch the raw feed bytes for `kind`
    ///
    /// The URL is `args.url` if set, otherwise the configured endpoint for the
    /// kind. The client is `args.client`, then the fetcher's shared client, then
    /// a fresh one.
    pub async fn fetch(
        &self,
        cancel: &CancellationToken,
        kind: impl IntoFeedKind,
        args: &FetchArgs,
    ) -> Result<Bytes> {
        let kind = kind.into_feed_kind()?;
        let url = args
            .url
            .as_deref()
            .unwrap_or_else(|| self.config.url_for(kind));
        let request = FetchRequest {
            url,
            client: args.client.as_ref().or(self.client.as_ref()),
            timeout: self.config.timeout,
            user_agent: &self.config.user_agent,
        };

        let body = fetch_bytes(cancel, request).await?;
        debug!(%kind, url, bytes = body.len(), "Fetched feed");
        Ok(body)
    }

    /// Fetch and decode into the shape chosen by `kind` at runtime
    pub async fn fetch_and_decode(
        &self,
        cancel: &CancellationToken,
        kind: impl IntoFeedKind,
        args: &FetchArgs,
    ) -> Result<AnyFeed> {
        let kind = kind.into_feed_kind()?;
        let body = self.fetch(cancel, kind, args).await?;
        let feed = decode_kind(kind, &body)?;
        info!(
            %kind,
            update_hash = feed.update_hash(),
            "Fetched and decoded feed"
        );
        Ok(feed)
    }

    /// Fetch and decode into the statically chosen shape `P`
    pub async fn fetch_and_decode_as<P: Platform>(
        &self,
        cancel: &CancellationToken,
        args: &FetchArgs,
    ) -> Result<Feed<P>> {
        let body = self.fetch(cancel, P::KIND, args).await?;
        let feed = decode::<P>(&body)?;
        info!(
            kind = %P::KIND,
            update_hash = %feed.update_hash,
            "Fetched and decoded feed"
        );
        Ok(feed)
    }

    /// Fetch and decode the macOS feed
    pub async fn fetch_macos(
        &self,
        cancel: &CancellationToken,
        args: &FetchArgs,
    ) -> Result<MacOSFeed> {
        self.fetch_and_decode_as::<MacOS>(cancel, args).await
    }

    /// Fetch and decode the iOS feed
    pub async fn fetch_ios(&self, cancel: &CancellationToken, args: &FetchArgs) -> Result<IosFeed> {
        self.fetch_and_decode_as::<Ios>(cancel, args).await
    }
}

/// Fetch raw bytes for `kind` using the default configuration
///
/// # Examples
///
/// ```no_run
/// use sofafeed::{fetch, CancellationToken, FetchArgs, FeedKind};
///
/// # async fn run() -> sofafeed::Result<()> {
/// let bytes = fetch(&CancellationToken::new(), FeedKind::Ios, &FetchArgs::default()).await?;
/// println!("{} bytes", bytes.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch(
    cancel: &CancellationToken,
    kind: impl IntoFeedKind,
    args: &FetchArgs,
) -> Result<Bytes> {
    FeedFetcher::default().fetch(cancel, kind, args).await
}

/// Decode bytes into the shape chosen by `kind`
///
/// Unlike [`crate::decode()`], the discriminator is resolved at runtime, so an
/// unknown value surfaces as [`Error::UnknownFeedKind`].
pub fn decode_feed(kind: impl IntoFeedKind, data: &[u8]) -> Result<AnyFeed> {
    let kind = kind.into_feed_kind()?;
    decode_kind(kind, data).map_err(Error::from)
}

/// Fetch and decode using the default configuration
pub async fn fetch_and_decode(
    cancel: &CancellationToken,
    kind: impl IntoFeedKind,
    args: &FetchArgs,
) -> Result<AnyFeed> {
    FeedFetcher::default()
        .fetch_and_decode(cancel, kind, args)
        .await
}

/// Fetch and decode into the statically chosen shape `P` using the default configuration
pub async fn fetch_and_decode_kind<P: Platform>(
    cancel: &CancellationToken,
    args: &FetchArgs,
) -> Result<Feed<P>> {
    FeedFetcher::default()
        .fetch_and_decode_as::<P>(cancel, args)
        .await
}

/// Fetch and decode the macOS feed from its default (or overridden) endpoint
///
/// # Examples
///
/// ```no_run
/// use sofafeed::{fetch_and_decode_macos, CancellationToken, FetchArgs};
///
/// # async fn run() -> sofafeed::Result<()> {
/// let feed = fetch_and_decode_macos(&CancellationToken::new(), &FetchArgs::default()).await?;
/// if let Some(apps) = feed.installation_apps() {
///     println!("latest installer: {}", apps.latest_uma.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn fetch_and_decode_macos(
    cancel: &CancellationToken,
    args: &FetchArgs,
) -> Result<MacOSFeed> {
    FeedFetcher::default().fetch_macos(cancel, args).await
}

/// Fetch and decode the iOS feed from its default (or overridden) endpoint
pub async fn fetch_and_decode_ios(
    cancel: &CancellationToken,
    args: &FetchArgs,
) -> Result<IosFeed> {
    FeedFetcher::default().fetch_ios(cancel, args).await
}

/// Decode macOS feed bytes
pub fn decode_macos(data: &[u8]) -> Result<MacOSFeed> {
    Ok(decode::<MacOS>(data)?)
}

/// Decode iOS feed bytes
pub fn decode_ios(data: &[u8]) -> Result<IosFeed> {
    Ok(decode::<Ios>(data)?)
}
