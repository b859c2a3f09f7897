//! Faultline Detector - platform issue pattern matching
//!
//! Turns raw error text into structured [`PlatformIssue`] records using
//! compiled-in tables for six platform tags. The detector holds no state and
//! performs no I/O; identical input always yields identical output.
//!
//! # Example
//!
//! ```rust
//! use faultline_detector::PlatformIssueDetector;
//! use faultline_taxonomy::{ErrorCategory, PlatformTag};
//!
//! let issues = PlatformIssueDetector::new().analyze(
//!     "Connection refused: cleartext http blocked",
//!     None,
//!     Some(ErrorCategory::Network),
//! );
//! assert!(issues.iter().any(|i| i.platform == PlatformTag::Android));
//! ```

#![warn(unreachable_pub)]

pub mod detector;
mod rules;

pub use detector::PlatformIssueDetector;
pub use faultline_taxonomy::{IssueType, PlatformIssue, PlatformTag};

/// Convenience wrapper over [`PlatformIssueDetector::analyze`]
#[must_use]
pub fn analyze(
    message: &str,
    stack: Option<&str>,
    category: Option<faultline_taxonomy::ErrorCategory>,
) -> Vec<PlatformIssue> {
    PlatformIssueDetector::new().analyze(message, stack, category)
}
