//! Lifecycle events for UI-layer observers
//!
//! Published on a channel separate from the hub's error, warning and info
//! channels.

use chrono::{DateTime, Utc};
use faultline_hub::DispatchOutcome;
use faultline_taxonomy::ErrorCategory;
use serde::Serialize;

/// Orchestrator lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// `initialize` completed
    Initialized {
        /// When
        at: DateTime<Utc>,
    },
    /// An error went through `report_error`
    ErrorReported {
        /// Message as reported
        message: String,
        /// Resolved category
        category: ErrorCategory,
        /// Passed the severity filter
        recorded: bool,
        /// Handler that consumed the error
        handled_by: Option<String>,
    },
    /// Debugging data was cleared
    DataCleared {
        /// When
        at: DateTime<Utc>,
    },
    /// Instance is shutting down; last event on the channel
    Disposed {
        /// When
        at: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    pub(crate) fn error_reported(
        message: &str,
        category: ErrorCategory,
        outcome: &DispatchOutcome,
    ) -> Self {
        Self::ErrorReported {
            message: message.to_string(),
            category,
            recorded: outcome.is_recorded(),
            handled_by: outcome.handled_by().map(str::to_string),
        }
    }

    /// Event name as serialized
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized { .. } => "initialized",
            Self::ErrorReported { .. } => "error_reported",
            Self::DataCleared { .. } => "data_cleared",
            Self::Disposed { .. } => "disposed",
        }
    }
}
