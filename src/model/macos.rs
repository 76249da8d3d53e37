//! Sections published only in the macOS feed

use super::{nullable, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Device model identifier (e.g. "Mac15,13") -> model details
pub type Models = BTreeMap<String, Model>;

/// Identifier type -> identifier value for a supported model
pub type Identifiers = BTreeMap<String, String>;

/// XProtect framework update information
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XProtectPayloads {
    /// Framework version
    #[serde(
        rename = "com.apple.XProtectFramework.XProtect",
        deserialize_with = "nullable::deserialize"
    )]
    pub xprotect: String,
    /// Plugin service version. The upstream key spells "Xprotect" in lower case.
    #[serde(
        rename = "com.apple.XprotectFramework.PluginService",
        deserialize_with = "nullable::deserialize"
    )]
    pub plugin_service: String,
    /// When the payload was released
    #[serde(rename = "ReleaseDate", with = "timestamp")]
    pub release_date: DateTime<Utc>,
}

/// XProtect plist configuration information
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XProtectPlistConfigData {
    /// Configuration version
    #[serde(rename = "com.apple.XProtect", deserialize_with = "nullable::deserialize")]
    pub xprotect: String,
    /// When the configuration was released
    #[serde(rename = "ReleaseDate", with = "timestamp")]
    pub release_date: DateTime<Utc>,
}

/// A Mac hardware model and the OS majors it supports
///
/// `SupportedOS` and `OSVersions` describe the same fact twice, as marketing
/// labels and as major version numbers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Model {
    /// Consumer-facing name, e.g. "MacBook Air (M1, 2020)"
    #[serde(rename = "MarketingName", deserialize_with = "nullable::deserialize")]
    pub marketing_name: String,
    /// Supported OS majors as labels, e.g. "Sequoia 15"
    #[serde(rename = "SupportedOS", deserialize_with = "nullable::deserialize")]
    pub supported_os: Vec<String>,
    /// Supported OS majors as numbers, e.g. 15
    #[serde(rename = "OSVersions", deserialize_with = "nullable::deserialize")]
    pub os_versions: Vec<i64>,
}

impl Model {
    /// Whether the model supports the given OS major
    pub fn supports_major(&self, major: i64) -> bool {
        self.os_versions.contains(&major)
    }
}

/// A model entry inside an OS version family's `SupportedModels`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedModel {
    /// Model name
    #[serde(rename = "Model", deserialize_with = "nullable::deserialize")]
    pub model: String,
    /// Link to the model's support page
    #[serde(rename = "URL", deserialize_with = "nullable::deserialize")]
    pub url: String,
    /// Known identifiers, e.g. "Model Identifier" -> "Mac15,13"
    #[serde(rename = "Identifiers", deserialize_with = "nullable::deserialize")]
    pub identifiers: Identifiers,
}

/// Installer downloads
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationApps {
    /// Newest full installer
    #[serde(rename = "LatestUMA", deserialize_with = "nullable::deserialize")]
    pub latest_uma: Uma,
    /// Earlier full installers, newest first as published
    #[serde(rename = "AllPreviousUMA", deserialize_with = "nullable::deserialize")]
    pub all_previous_uma: Vec<Uma>,
    /// Newest restore image
    #[serde(rename = "LatestMacIPSW", deserialize_with = "nullable::deserialize")]
    pub latest_mac_ipsw: Ipsw,
}

/// Universal macOS installer (InstallAssistant.pkg) artifact
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Uma {
    /// Installer name, e.g. "macOS Sequoia"
    #[serde(deserialize_with = "nullable::deserialize")]
    pub title: String,
    /// OS version
    #[serde(deserialize_with = "nullable::deserialize")]
    pub version: String,
    /// Build number
    #[serde(deserialize_with = "nullable::deserialize")]
    pub build: String,
    /// Vendor product slug
    #[serde(deserialize_with = "nullable::deserialize")]
    pub apple_slug: String,
    /// Download URL
    #[serde(deserialize_with = "nullable::deserialize")]
    pub url: String,
}

/// Restore image (IPSW) artifact
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Ipsw {
    /// Download URL
    #[serde(rename = "macos_ipsw_url", deserialize_with = "nullable::deserialize")]
    pub url: String,
    /// Build number
    #[serde(rename = "macos_ipsw_build", deserialize_with = "nullable::deserialize")]
    pub build: String,
    /// OS version
    #[serde(rename = "macos_ipsw_version", deserialize_with = "nullable::deserialize")]
    pub version: String,
    /// Vendor product slug
    #[serde(rename = "macos_ipsw_apple_slug", deserialize_with = "nullable::deserialize")]
    pub apple_slug: String,
}

/// Root-level sections of the macOS feed
///
/// Each section is independently optional: `None` means the key was absent (or
/// `null`), which is distinct from a present but empty object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacOSFeedExtras {
    /// XProtect framework payload info
    #[serde(
        rename = "XProtectPayloads",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub xprotect_payloads: Option<XProtectPayloads>,
    /// XProtect plist config info
    #[serde(
        rename = "XProtectPlistConfigData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub xprotect_plist_config_data: Option<XProtectPlistConfigData>,
    /// Hardware models keyed by model identifier
    #[serde(rename = "Models", default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Models>,
    /// Installer downloads
    #[serde(
        rename = "InstallationApps",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub installation_apps: Option<InstallationApps>,
}

/// Per-family section of the macOS feed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacOSOsVersionExtras {
    /// Hardware supported by this OS major
    #[serde(
        rename = "SupportedModels",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub supported_models: Option<Vec<SupportedModel>>,
}
