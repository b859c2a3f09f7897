//! Faultline Hub - reporting hub and handler chain
//!
//! The hub is the single ingestion point of the pipeline:
//! - filters by minimum severity
//! - keeps clearable history and running statistics
//! - fans events out on per-kind broadcast channels
//! - drives each event through a priority-ordered handler chain
//!
//! # Example
//!
//! ```rust,ignore
//! use faultline_hub::{Enhancer, ReportingHub};
//! use faultline_taxonomy::{ErrorCategory, ErrorEvent};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let hub = ReportingHub::default();
//! hub.add_error_handler(Arc::new(Enhancer::new()));
//! hub.report_error(ErrorEvent::new("socket closed", ErrorCategory::Network)).await;
//! assert_eq!(hub.statistics().total_errors, 1);
//! # }
//! ```

#![warn(unreachable_pub)]

mod advice;
pub mod channel;
pub mod enhancer;
pub mod error;
pub mod handler;
pub mod hub;
pub mod tracing_handler;

pub use channel::{Broadcaster, EventSubscription, DEFAULT_CHANNEL_CAPACITY};
pub use enhancer::{EnhancedReport, Enhancer, DEFAULT_RECENT_CAPACITY, ENHANCER_PRIORITY};
pub use error::HandlerError;
pub use handler::{DispatchOutcome, Disposition, ErrorHandler, HandlerResult};
pub use hub::{in_handler_dispatch, HubConfig, ReportingHub};
pub use tracing_handler::{TracingHandler, TRACING_PRIORITY};
