//! # sofafeed
//!
//! Client library for the SOFA software-update feeds published at
//! `sofafeed.macadmins.io`.
//!
//! Two feeds are published: the macOS (desktop) feed and the iOS (mobile) feed.
//! Both list OS version families with their latest release and historical
//! security releases, including CVE and device-support data. The macOS feed
//! adds XProtect versions, hardware models and installer downloads.
//!
//! The library fetches a feed over HTTP and decodes it into typed structs. It
//! keeps no state between calls: no caching, no polling, no retries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sofafeed::{fetch_and_decode_macos, CancellationToken, FetchArgs, ReleaseDetails};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cancel = CancellationToken::new();
//!     let feed = fetch_and_decode_macos(&cancel, &FetchArgs::default()).await?;
//!
//!     for family in &feed.os_versions {
//!         println!(
//!             "{}: {} ({}), exploited: {}",
//!             family.os_version,
//!             family.latest.product_version,
//!             family.latest.build,
//!             family.latest.is_actively_exploited()
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Use [`FeedFetcher`] to point at a mirror or change the timeout, and
//! [`decode()`] to decode bytes obtained elsewhere.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Bytes to typed feed decoding
pub mod decode;
/// Error types
pub mod error;
/// HTTP retrieval
pub mod fetch;
/// Feed variant selection
pub mod kind;
/// Typed document model
pub mod model;
/// Fetch-and-decode orchestration
pub mod pipeline;

pub use config::{DEFAULT_TIMEOUT, FeedConfig, FetchArgs, USER_AGENT};
pub use decode::{decode, decode_kind, decode_str};
pub use error::{DecodeError, Error, FetchError, Result, Stage};
pub use fetch::{FetchRequest, fetch_bytes};
pub use kind::{FeedKind, IOS_FEED_URL, IntoFeedKind, MACOS_FEED_URL, select};
pub use model::{
    AnyFeed, AuditReport, CveMismatch, Cves, Feed, InstallationApps, Ios, IosFeed, Ipsw, MacOS,
    MacOSFeed, Model, Models, OsVersion, OsVersionDetails, Platform, ReleaseDetails,
    SecurityRelease, SupportedModel, Uma, XProtectPayloads, XProtectPlistConfigData,
};
pub use pipeline::{
    FeedFetcher, decode_feed, decode_ios, decode_macos, fetch, fetch_and_decode,
    fetch_and_decode_ios, fetch_and_decode_kind, fetch_and_decode_macos,
};
pub use tokio_util::sync::CancellationToken;
