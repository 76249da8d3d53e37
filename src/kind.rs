//! Feed variant selection

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default endpoint for the macOS feed
pub const MACOS_FEED_URL: &str = "https://sofafeed.macadmins.io/v1/macos_data_feed.json";

/// Default endpoint for the iOS feed
pub const IOS_FEED_URL: &str = "https://sofafeed.macadmins.io/v1/ios_data_feed.json";

/// Which of the two published feeds to work with
///
/// The macOS (desktop) feed carries XProtect, model and installer sections that
/// the iOS (mobile) feed lacks. The kind decides both the default endpoint and
/// the document shape the response is decoded into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Desktop feed
    #[serde(rename = "macos")]
    MacOS,
    /// Mobile feed
    Ios,
}

impl FeedKind {
    /// Both kinds, desktop first
    pub const ALL: [FeedKind; 2] = [FeedKind::MacOS, FeedKind::Ios];

    /// Discriminator string accepted by [`select`]
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::MacOS => "macos",
            FeedKind::Ios => "ios",
        }
    }

    /// Published endpoint for this kind
    pub fn default_url(&self) -> &'static str {
        match self {
            FeedKind::MacOS => MACOS_FEED_URL,
            FeedKind::Ios => IOS_FEED_URL,
        }
    }

    /// Whether documents of this kind carry the desktop-only sections
    pub fn has_desktop_sections(&self) -> bool {
        matches!(self, FeedKind::MacOS)
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("macos") {
            Ok(FeedKind::MacOS)
        } else if trimmed.eq_ignore_ascii_case("ios") {
            Ok(FeedKind::Ios)
        } else {
            Err(Error::UnknownFeedKind {
                kind: s.to_string(),
            })
        }
    }
}

/// Resolve a caller-supplied discriminator into a [`FeedKind`]
///
/// Accepts `"macos"` and `"ios"` in any ASCII case. Anything else is reported as
/// [`Error::UnknownFeedKind`] carrying the original value.
///
/// ```
/// use sofafeed::{select, FeedKind};
///
/// assert_eq!(select("macOS").unwrap(), FeedKind::MacOS);
/// assert!(select("watchos").is_err());
/// ```
pub fn select(discriminator: &str) -> Result<FeedKind> {
    discriminator.parse()
}

/// Anything the pipeline accepts as a feed discriminator
///
/// Implemented for [`FeedKind`] itself (infallible) and for strings, which go
/// through [`select`].
pub trait IntoFeedKind {
    /// Resolve into a [`FeedKind`]
    fn into_feed_kind(self) -> Result<FeedKind>;
}

impl IntoFeedKind for FeedKind {
    fn into_feed_kind(self) -> Result<FeedKind> {
        Ok(self)
    }
}

impl IntoFeedKind for &str {
    fn into_feed_kind(self) -> Result<FeedKind> {
        select(self)
    }
}

impl IntoFeedKind for &String {
    fn into_feed_kind(self) -> Result<FeedKind> {
        select(self)
    }
}

impl IntoFeedKind for String {
    fn into_feed_kind(self) -> Result<FeedKind> {
        select(&self)
    }
}
