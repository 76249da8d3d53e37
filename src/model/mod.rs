//! Typed document model for the SOFA feeds
//!
//! Both feeds share the same core: an update hash and a list of OS version
//! families, each with its latest release and historical security releases. The
//! macOS feed adds XProtect, hardware model and installer sections at the root
//! and a `SupportedModels` list per family.
//!
//! The shared core is written once as [`Feed<P>`] / [`OsVersion<P>`]. The
//! [`Platform`] marker `P` supplies the variant-specific extension types, which
//! serde flattens into the same JSON object. An [`IosFeed`] therefore has no
//! desktop fields at all, and a [`MacOSFeed`] has them as independently optional
//! sections.

mod audit;
mod macos;
mod nullable;
mod release;
pub mod timestamp;

pub use audit::{AuditReport, CveMismatch, Finding, Issue, ReleaseRef, exploited_cve_mismatches};
pub use macos::{
    Identifiers, InstallationApps, Ipsw, MacOSFeedExtras, MacOSOsVersionExtras, Model, Models,
    SupportedModel, Uma, XProtectPayloads, XProtectPlistConfigData,
};
pub use release::{Cves, OsVersionDetails, ReleaseDetails, SecurityRelease};

use crate::kind::FeedKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::MacOS {}
    impl Sealed for super::Ios {}
}

/// Marker for one feed variant, binding it to its extension types
///
/// Sealed: the two implementors are [`MacOS`] and [`Ios`].
pub trait Platform:
    sealed::Sealed + Copy + Debug + Default + PartialEq + Send + Sync + 'static
{
    /// The runtime discriminator for this variant
    const KIND: FeedKind;

    /// Extra root-level sections
    type FeedExtras: Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Extra per-family sections
    type OsVersionExtras: Clone
        + Debug
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync;
}

/// Desktop feed marker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MacOS;

/// Mobile feed marker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ios;

/// The iOS feed has no root-level sections beyond the shared core
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosFeedExtras {}

/// The iOS feed has no per-family sections beyond the shared core
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IosOsVersionExtras {}

impl Platform for MacOS {
    const KIND: FeedKind = FeedKind::MacOS;
    type FeedExtras = MacOSFeedExtras;
    type OsVersionExtras = MacOSOsVersionExtras;
}

impl Platform for Ios {
    const KIND: FeedKind = FeedKind::Ios;
    type FeedExtras = IosFeedExtras;
    type OsVersionExtras = IosOsVersionExtras;
}

/// A decoded feed document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Feed<P: Platform> {
    /// Opaque fingerprint of this feed snapshot
    #[serde(rename = "UpdateHash", default, deserialize_with = "nullable::deserialize")]
    pub update_hash: String,

    /// OS version families, in published order
    #[serde(rename = "OSVersions", default, deserialize_with = "nullable::deserialize")]
    pub os_versions: Vec<OsVersion<P>>,

    /// Variant-specific root sections
    #[serde(flatten)]
    pub extras: P::FeedExtras,
}

/// One OS major version family, e.g. "Sequoia 15" or "18"
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct OsVersion<P: Platform> {
    /// Family label
    #[serde(rename = "OSVersion", default, deserialize_with = "nullable::deserialize")]
    pub os_version: String,

    /// Most recent release
    #[serde(rename = "Latest", default, deserialize_with = "nullable::deserialize")]
    pub latest: OsVersionDetails,

    /// Historical releases, newest first as published
    #[serde(rename = "SecurityReleases", default, deserialize_with = "nullable::deserialize")]
    pub security_releases: Vec<SecurityRelease>,

    /// Variant-specific per-family sections
    #[serde(flatten)]
    pub extras: P::OsVersionExtras,
}

/// macOS feed document
pub type MacOSFeed = Feed<MacOS>;

/// iOS feed document
pub type IosFeed = Feed<Ios>;

impl<P: Platform> Feed<P> {
    /// Variant this document was decoded as
    pub fn kind(&self) -> FeedKind {
        P::KIND
    }

    /// Family with the given `OSVersion` label
    pub fn os_version(&self, label: &str) -> Option<&OsVersion<P>> {
        self.os_versions.iter().find(|v| v.os_version == label)
    }

    /// Latest release of the given family
    pub fn latest(&self, label: &str) -> Option<&OsVersionDetails> {
        self.os_version(label).map(|v| &v.latest)
    }

    /// Every release record in the document, latest first within each family
    pub fn releases(&self) -> impl Iterator<Item = (&str, &dyn ReleaseDetails)> {
        self.os_versions.iter().flat_map(|family| {
            let label = family.os_version.as_str();
            std::iter::once((label, &family.latest as &dyn ReleaseDetails)).chain(
                family
                    .security_releases
                    .iter()
                    .map(move |r| (label, r as &dyn ReleaseDetails)),
            )
        })
    }

    /// Check CVE and count consistency across every release record
    pub fn audit(&self) -> AuditReport {
        let mut report = AuditReport::default();
        for family in &self.os_versions {
            report.check_release(&family.os_version, ReleaseRef::Latest, &family.latest);
            for (index, release) in family.security_releases.iter().enumerate() {
                report.check_release(
                    &family.os_version,
                    ReleaseRef::Security {
                        index,
                        product_version: release.product_version.clone(),
                    },
                    release,
                );
            }
        }
        report
    }
}

impl<P: Platform> OsVersion<P> {
    /// Historical release with the given product version
    pub fn security_release(&self, product_version: &str) -> Option<&SecurityRelease> {
        self.security_releases
            .iter()
            .find(|r| r.product_version == product_version)
    }
}

impl Feed<MacOS> {
    /// XProtect framework payload info, if published
    pub fn xprotect_payloads(&self) -> Option<&XProtectPayloads> {
        self.extras.xprotect_payloads.as_ref()
    }

    /// XProtect plist config info, if published
    pub fn xprotect_plist_config_data(&self) -> Option<&XProtectPlistConfigData> {
        self.extras.xprotect_plist_config_data.as_ref()
    }

    /// Hardware models, if published
    pub fn models(&self) -> Option<&Models> {
        self.extras.models.as_ref()
    }

    /// One hardware model by identifier
    pub fn model(&self, id: &str) -> Option<&Model> {
        self.models().and_then(|m| m.get(id))
    }

    /// Installer downloads, if published
    pub fn installation_apps(&self) -> Option<&InstallationApps> {
        self.extras.installation_apps.as_ref()
    }
}

impl OsVersion<MacOS> {
    /// Hardware supported by this family, if published
    pub fn supported_models(&self) -> Option<&[SupportedModel]> {
        self.extras.supported_models.as_deref()
    }
}

/// A feed whose variant was chosen at runtime
///
/// Accessors for desktop-only sections return `None` for the iOS variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyFeed {
    /// Decoded as the macOS feed
    MacOS(MacOSFeed),
    /// Decoded as the iOS feed
    Ios(IosFeed),
}

impl AnyFeed {
    /// Variant this document was decoded as
    pub fn kind(&self) -> FeedKind {
        match self {
            AnyFeed::MacOS(_) => FeedKind::MacOS,
            AnyFeed::Ios(_) => FeedKind::Ios,
        }
    }

    /// Opaque fingerprint of this feed snapshot
    pub fn update_hash(&self) -> &str {
        match self {
            AnyFeed::MacOS(f) => &f.update_hash,
            AnyFeed::Ios(f) => &f.update_hash,
        }
    }

    /// `OSVersion` labels in published order
    pub fn os_version_labels(&self) -> Vec<&str> {
        match self {
            AnyFeed::MacOS(f) => f.os_versions.iter().map(|v| v.os_version.as_str()).collect(),
            AnyFeed::Ios(f) => f.os_versions.iter().map(|v| v.os_version.as_str()).collect(),
        }
    }

    /// Latest release of the given family
    pub fn latest(&self, label: &str) -> Option<&OsVersionDetails> {
        match self {
            AnyFeed::MacOS(f) => f.latest(label),
            AnyFeed::Ios(f) => f.latest(label),
        }
    }

    /// Historical releases of the given family
    pub fn security_releases(&self, label: &str) -> Option<&[SecurityRelease]> {
        match self {
            AnyFeed::MacOS(f) => f.os_version(label).map(|v| v.security_releases.as_slice()),
            AnyFeed::Ios(f) => f.os_version(label).map(|v| v.security_releases.as_slice()),
        }
    }

    /// XProtect framework payload info (macOS only)
    pub fn xprotect_payloads(&self) -> Option<&XProtectPayloads> {
        self.as_macos().and_then(Feed::xprotect_payloads)
    }

    /// XProtect plist config info (macOS only)
    pub fn xprotect_plist_config_data(&self) -> Option<&XProtectPlistConfigData> {
        self.as_macos().and_then(Feed::xprotect_plist_config_data)
    }

    /// Hardware models (macOS only)
    pub fn models(&self) -> Option<&Models> {
        self.as_macos().and_then(Feed::models)
    }

    /// Installer downloads (macOS only)
    pub fn installation_apps(&self) -> Option<&InstallationApps> {
        self.as_macos().and_then(Feed::installation_apps)
    }

    /// Borrow as the macOS document
    pub fn as_macos(&self) -> Option<&MacOSFeed> {
        match self {
            AnyFeed::MacOS(f) => Some(f),
            AnyFeed::Ios(_) => None,
        }
    }

    /// Borrow as the iOS document
    pub fn as_ios(&self) -> Option<&IosFeed> {
        match self {
            AnyFeed::Ios(f) => Some(f),
            AnyFeed::MacOS(_) => None,
        }
    }

    /// Take the macOS document, or give back `self`
    pub fn into_macos(self) -> std::result::Result<MacOSFeed, Self> {
        match self {
            AnyFeed::MacOS(f) => Ok(f),
            other => Err(other),
        }
    }

    /// Take the iOS document, or give back `self`
    pub fn into_ios(self) -> std::result::Result<IosFeed, Self> {
        match self {
            AnyFeed::Ios(f) => Ok(f),
            other => Err(other),
        }
    }

    /// See [`Feed::audit`]
    pub fn audit(&self) -> AuditReport {
        match self {
            AnyFeed::MacOS(f) => f.audit(),
            AnyFeed::Ios(f) => f.audit(),
        }
    }
}

impl From<MacOSFeed> for AnyFeed {
    fn from(feed: MacOSFeed) -> Self {
        AnyFeed::MacOS(feed)
    }
}

impl From<IosFeed> for AnyFeed {
    fn from(feed: IosFeed) -> Self {
        AnyFeed::Ios(feed)
    }
}
