//! Report severity
//!
//! Totally ordered: `Debug < Info < Warning < Error < Critical`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity axis used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSeverity {
    /// Diagnostic chatter
    Debug,
    /// Informational
    Info,
    /// Recoverable problem
    Warning,
    /// Failure
    Error,
    /// Failure that threatens the process
    Critical,
}

impl ReportSeverity {
    /// Every level, lowest first
    pub const ALL: [ReportSeverity; 5] = [
        ReportSeverity::Debug,
        ReportSeverity::Info,
        ReportSeverity::Warning,
        ReportSeverity::Error,
        ReportSeverity::Critical,
    ];

    /// Stable lowercase identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Whether an event of this severity passes a `minimum` filter
    #[inline]
    #[must_use]
    pub fn passes(&self, minimum: ReportSeverity) -> bool {
        *self >= minimum
    }
}

impl fmt::Display for ReportSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized severity name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: '{0}'")]
pub struct ParseSeverityError(pub String);

impl FromStr for ReportSeverity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" | "fatal" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
