//! Faultline Async - operation tracking across suspension points
//!
//! Wraps futures and streams so that a failure anywhere inside them reaches
//! the reporting hub with the operation's name, breadcrumb and duration,
//! while the caller still receives the original error.
//!
//! Every wrapped operation is registered on first poll and leaves the
//! active registry exactly once, whether it completes, fails or is dropped.
//! Operations registered manually through [`OperationTracker::begin`] and
//! never finished are reaped by [`OperationTracker::sweep_stale`].
//!
//! # Example
//!
//! ```rust,ignore
//! use faultline_async::{OperationSpec, OperationTracker, TrackerConfig};
//! use faultline_hub::ReportingHub;
//! use faultline_taxonomy::ErrorCategory;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let tracker = OperationTracker::new(Arc::new(ReportingHub::default()), TrackerConfig::default());
//! let spec = OperationSpec::new("loadUser").with_category(ErrorCategory::Network);
//! let result = tracker.wrap_future(async { Err::<(), _>("timeout") }, spec).await;
//! assert!(result.is_err());
//! assert_eq!(tracker.hub().statistics().total_errors, 1);
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod context;
pub mod tracker;
mod wrap;

pub use context::{
    AsyncOperationContext, OperationId, OperationSpec, OperationState, OperationStats,
};
pub use tracker::{
    current_chain, OperationTracker, TrackerConfig, BREADCRUMB_KEY, DEFAULT_HISTORY_CAPACITY,
    DURATION_MS_KEY, OPERATION_ID_KEY,
};
