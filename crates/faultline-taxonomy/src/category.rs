//! Error categories
//!
//! The closed set of categories used to route category-specific advice and
//! to group statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary classification of an error event
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Misconfigured application or environment
    Configuration,
    /// State container / store failures
    StateManagement,
    /// Routing and navigation failures
    Navigation,
    /// Test harness and assertion failures
    Testing,
    /// Slow frames, leaks, budget overruns
    Performance,
    /// Failures from the code generation collaborator
    CodeGeneration,
    /// Tooling (debugger, inspector, hot reload) failures
    DevelopmentTools,
    /// File and directory access
    FileSystem,
    /// Connectivity and transport
    Network,
    /// Input or schema validation
    Validation,
    /// Anything not classified
    #[default]
    Unknown,
}

/// Keyword table used by [`ErrorCategory::infer`], checked in order
const INFERENCE_KEYWORDS: &[(ErrorCategory, &[&str])] = &[
    (
        ErrorCategory::Network,
        &[
            "socket",
            "connection",
            "http",
            "timeout",
            "dns",
            "cleartext",
            "network",
            "cors",
        ],
    ),
    (
        ErrorCategory::FileSystem,
        &["no such file", "file not found", "directory", "permission denied", "path"],
    ),
    (
        ErrorCategory::Navigation,
        &["route", "navigator", "navigation", "deep link"],
    ),
    (
        ErrorCategory::StateManagement,
        &["provider", "state", "store", "dispatch", "reducer"],
    ),
    (
        ErrorCategory::CodeGeneration,
        &["codegen", "generated", "build_runner", "part of", "annotation"],
    ),
    (
        ErrorCategory::Testing,
        &["expect", "assert", "test failed", "mock"],
    ),
    (
        ErrorCategory::Performance,
        &["jank", "frame", "slow", "memory", "leak", "out of memory"],
    ),
    (
        ErrorCategory::Configuration,
        &["config", "environment variable", "missing key", "manifest"],
    ),
    (
        ErrorCategory::Validation,
        &["invalid", "validation", "must be", "required field"],
    ),
    (
        ErrorCategory::DevelopmentTools,
        &["debugger", "hot reload", "devtools", "inspector"],
    ),
];

impl ErrorCategory {
    /// Every category, in declaration order
    pub const ALL: [ErrorCategory; 11] = [
        ErrorCategory::Configuration,
        ErrorCategory::StateManagement,
        ErrorCategory::Navigation,
        ErrorCategory::Testing,
        ErrorCategory::Performance,
        ErrorCategory::CodeGeneration,
        ErrorCategory::DevelopmentTools,
        ErrorCategory::FileSystem,
        ErrorCategory::Network,
        ErrorCategory::Validation,
        ErrorCategory::Unknown,
    ];

    /// Stable snake_case identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::StateManagement => "state_management",
            Self::Navigation => "navigation",
            Self::Testing => "testing",
            Self::Performance => "performance",
            Self::CodeGeneration => "code_generation",
            Self::DevelopmentTools => "development_tools",
            Self::FileSystem => "file_system",
            Self::Network => "network",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration",
            Self::StateManagement => "State Management",
            Self::Navigation => "Navigation",
            Self::Testing => "Testing",
            Self::Performance => "Performance",
            Self::CodeGeneration => "Code Generation",
            Self::DevelopmentTools => "Development Tools",
            Self::FileSystem => "File System",
            Self::Network => "Network",
            Self::Validation => "Validation",
            Self::Unknown => "Unknown",
        }
    }

    /// Classify a raw message by keyword
    ///
    /// Used when a caller reports an error without naming a category.
    /// Returns [`ErrorCategory::Unknown`] when nothing matches.
    #[must_use]
    pub fn infer(message: &str) -> Self {
        let lower = message.to_lowercase();
        INFERENCE_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map_or(Self::Unknown, |(category, _)| *category)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized category name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error category: '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for ErrorCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized || c.as_str().replace('_', "") == normalized)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}
