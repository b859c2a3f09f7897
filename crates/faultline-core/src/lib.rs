//! Faultline Core - diagnostics orchestrator
//!
//! The composition root and external API of the pipeline:
//! - error reporting with category inference, breadcrumbs and platform issues
//! - future and stream wrapping through the operation tracker
//! - system diagnostics and point-in-time snapshots
//! - lifecycle events and the panic sink
//!
//! # Example
//!
//! ```rust,ignore
//! use faultline_core::{DiagnosticsConfig, DiagnosticsOrchestrator, ReportOptions};
//! use faultline_taxonomy::ErrorCategory;
//!
//! # async fn example() {
//! let diagnostics = DiagnosticsOrchestrator::new(DiagnosticsConfig::default());
//! diagnostics.initialize().unwrap();
//!
//! diagnostics
//!     .report_error(
//!         "Connection refused",
//!         ReportOptions::new().with_category(ErrorCategory::Network),
//!     )
//!     .await;
//!
//! let snapshot = diagnostics.capture_snapshot();
//! println!("{}", snapshot.to_json().unwrap());
//! diagnostics.dispose();
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod global;
pub mod lifecycle;
pub mod options;
pub mod orchestrator;
pub mod panic_hook;

pub use config::DiagnosticsConfig;
pub use diagnostics::{DiagnosticSnapshot, SystemDiagnostics, SNAPSHOT_EVENT_LIMIT};
pub use error::DiagnosticsError;
pub use lifecycle::LifecycleEvent;
pub use options::ReportOptions;
pub use orchestrator::{DiagnosticsOrchestrator, PLATFORM_ISSUES_KEY};
pub use panic_hook::PanicHookGuard;

/// Version of the diagnostics pipeline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
