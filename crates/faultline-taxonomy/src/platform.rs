//! Platform tags and platform issue records

use crate::severity::ReportSeverity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deployment target used to select issue-pattern tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformTag {
    /// Desktop
    Windows,
    /// Desktop
    #[serde(rename = "macos")]
    MacOs,
    /// Mobile
    Android,
    /// Mobile
    Ios,
    /// Server / console
    Linux,
    /// Browser
    Web,
}

impl PlatformTag {
    /// All tags in table order
    pub const ALL: [PlatformTag; 6] = [
        PlatformTag::Windows,
        PlatformTag::MacOs,
        PlatformTag::Android,
        PlatformTag::Ios,
        PlatformTag::Linux,
        PlatformTag::Web,
    ];

    /// Tag for the platform this binary was compiled for
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_arch = "wasm32") {
            Self::Web
        } else {
            Self::Linux
        }
    }

    /// Desktop-like target
    #[inline]
    #[must_use]
    pub fn is_desktop(&self) -> bool {
        matches!(self, Self::Windows | Self::MacOs)
    }

    /// Mobile-like target
    #[inline]
    #[must_use]
    pub fn is_mobile(&self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }

    /// Stable lowercase identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Linux => "linux",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of platform problem a pattern detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Cleartext traffic, ATS, certificate pinning
    NetworkSecurity,
    /// Missing runtime or manifest permission
    Permission,
    /// Exhaustion or leaks
    Memory,
    /// Toolchain or build configuration
    Build,
    /// Code signing and provisioning
    Signing,
    /// Sandbox or entitlement restriction
    Sandbox,
    /// Cross-origin restriction
    Cors,
    /// Browser or device storage quota
    Storage,
    /// Path length, locking, case sensitivity
    FileSystem,
    /// Work on the wrong thread
    Threading,
    /// Missing native library or plugin
    Dependency,
    /// App lifecycle misuse
    Lifecycle,
}

impl IssueType {
    /// Whether the issue concerns network security
    #[inline]
    #[must_use]
    pub fn is_network_security(&self) -> bool {
        matches!(self, Self::NetworkSecurity | Self::Cors)
    }
}

/// A structured, platform-specific diagnosis derived from event text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIssue {
    /// Platform the advice applies to
    pub platform: PlatformTag,
    /// Issue classification
    pub issue_type: IssueType,
    /// Short title
    pub title: String,
    /// What is happening
    pub description: String,
    /// How to fix it
    pub solution: String,
    /// How serious the issue is
    pub severity: ReportSeverity,
}
