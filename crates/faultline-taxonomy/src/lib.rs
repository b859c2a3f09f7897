//! Faultline Taxonomy - typed diagnostic event model
//!
//! The leaf crate of the diagnostics pipeline:
//! - [`DiagnosticEvent`] with its `Error` / `Warning` / `Info` variants
//! - [`ErrorCategory`] for routing and grouping
//! - [`ReportSeverity`] for filtering
//! - [`ErrorStatistics`] aggregated from event history
//! - [`PlatformIssue`] records produced by the detector
//!
//! # Example
//!
//! ```rust
//! use faultline_taxonomy::{DiagnosticEvent, ErrorCategory, ErrorEvent, ReportSeverity};
//!
//! let event: DiagnosticEvent = ErrorEvent::new("socket closed", ErrorCategory::Network)
//!     .with_suggestion("Check connectivity")
//!     .into();
//! assert_eq!(event.severity(), ReportSeverity::Error);
//! ```

#![warn(unreachable_pub)]

pub mod category;
pub mod event;
pub mod platform;
pub mod severity;
pub mod stack;
pub mod statistics;

pub use category::{ErrorCategory, ParseCategoryError};
pub use event::{
    Context, DiagnosticEvent, DomainDetails, ErrorEvent, EventKind, InfoEvent, WarningEvent,
    OPERATION_NAME_KEY,
};
pub use platform::{IssueType, PlatformIssue, PlatformTag};
pub use severity::{ParseSeverityError, ReportSeverity};
pub use stack::StackTrace;
pub use statistics::ErrorStatistics;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
