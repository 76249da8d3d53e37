//! Release records shared by both feed variants

use super::audit::{CveMismatch, exploited_cve_mismatches};
use super::{nullable, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CVE identifier -> "actively exploited" flag
///
/// The feed also publishes the true-valued keys as a separate list
/// (`ActivelyExploitedCVEs`). Both are kept as received; see
/// [`ReleaseDetails::exploited_cves_consistent`].
pub type Cves = BTreeMap<String, bool>;

/// The most recent release of an OS version family (`Latest`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct OsVersionDetails {
    /// Full version number, e.g. "15.3"
    #[serde(deserialize_with = "nullable::deserialize")]
    pub product_version: String,
    /// Build number, e.g. "24D60"
    #[serde(deserialize_with = "nullable::deserialize")]
    pub build: String,
    /// When the version was released
    #[serde(with = "timestamp")]
    pub release_date: DateTime<Utc>,
    /// When the version stops being signed, if published
    #[serde(with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    /// Device identifiers this release installs on
    #[serde(deserialize_with = "nullable::deserialize")]
    pub supported_devices: Vec<String>,
    /// URL of the vendor security notes
    #[serde(deserialize_with = "nullable::deserialize")]
    pub security_info: String,
    /// CVEs addressed by this release
    #[serde(rename = "CVEs", deserialize_with = "nullable::deserialize")]
    pub cves: Cves,
    /// CVEs exploited before the fix shipped
    #[serde(rename = "ActivelyExploitedCVEs", deserialize_with = "nullable::deserialize")]
    pub actively_exploited_cves: Vec<String>,
    /// Number of distinct CVEs addressed, as published (advisory)
    #[serde(rename = "UniqueCVEsCount", deserialize_with = "nullable::deserialize")]
    pub unique_cves_count: i64,
}

/// One historical update within an OS version family
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SecurityRelease {
    /// User-facing update name, e.g. "macOS Sequoia 15.3"
    #[serde(deserialize_with = "nullable::deserialize")]
    pub update_name: String,
    /// Operating system name
    #[serde(deserialize_with = "nullable::deserialize")]
    pub product_name: String,
    /// Full version number
    #[serde(deserialize_with = "nullable::deserialize")]
    pub product_version: String,
    /// When the update was released
    #[serde(with = "timestamp")]
    pub release_date: DateTime<Utc>,
    /// Release classification, e.g. "OS" or "RSR"
    #[serde(deserialize_with = "nullable::deserialize")]
    pub release_type: String,
    /// URL of the vendor security notes
    #[serde(deserialize_with = "nullable::deserialize")]
    pub security_info: String,
    /// Device identifiers this update installs on
    #[serde(deserialize_with = "nullable::deserialize")]
    pub supported_devices: Vec<String>,
    /// CVEs addressed by this update
    #[serde(rename = "CVEs", deserialize_with = "nullable::deserialize")]
    pub cves: Cves,
    /// CVEs exploited before the fix shipped
    #[serde(rename = "ActivelyExploitedCVEs", deserialize_with = "nullable::deserialize")]
    pub actively_exploited_cves: Vec<String>,
    /// Number of distinct CVEs addressed, as published (advisory)
    #[serde(rename = "UniqueCVEsCount", deserialize_with = "nullable::deserialize")]
    pub unique_cves_count: i64,
    /// Days elapsed since the previous release in this family
    #[serde(deserialize_with = "nullable::deserialize")]
    pub days_since_previous_release: i64,
}

/// Read access common to [`OsVersionDetails`] and [`SecurityRelease`]
pub trait ReleaseDetails {
    /// Full version number
    fn product_version(&self) -> &str;
    /// Release instant
    fn release_date(&self) -> DateTime<Utc>;
    /// Supported device identifiers
    fn supported_devices(&self) -> &[String];
    /// CVE map
    fn cves(&self) -> &Cves;
    /// Actively exploited CVE list
    fn actively_exploited_cves(&self) -> &[String];
    /// Published unique CVE count
    fn unique_cves_count(&self) -> i64;

    /// Whether the CVE map flags `cve` as actively exploited
    fn is_actively_exploited(&self, cve: &str) -> bool {
        self.cves().get(cve).copied().unwrap_or(false)
    }

    /// Whether the release lists `device` among its supported devices
    fn supports_device(&self, device: &str) -> bool {
        self.supported_devices().iter().any(|d| d == device)
    }

    /// Disagreements between the CVE map and the exploited list
    fn cve_mismatches(&self) -> Vec<CveMismatch> {
        exploited_cve_mismatches(self.cves(), self.actively_exploited_cves())
    }

    /// True when the exploited list holds exactly the CVEs flagged `true` in the map
    fn exploited_cves_consistent(&self) -> bool {
        self.cve_mismatches().is_empty()
    }
}

macro_rules! impl_release_details {
    ($ty:ty) => {
        impl ReleaseDetails for $ty {
            fn product_version(&self) -> &str {
                &self.product_version
            }

            fn release_date(&self) -> DateTime<Utc> {
                self.release_date
            }

            fn supported_devices(&self) -> &[String] {
                &self.supported_devices
            }

            fn cves(&self) -> &Cves {
                &self.cves
            }

            fn actively_exploited_cves(&self) -> &[String] {
                &self.actively_exploited_cves
            }

            fn unique_cves_count(&self) -> i64 {
                self.unique_cves_count
            }
        }
    };
}

impl_release_details!(OsVersionDetails);
impl_release_details!(SecurityRelease);
