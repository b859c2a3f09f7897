//! Handler capability
//!
//! Handlers form a chain of responsibility ordered by descending priority.
//! Returning [`Disposition::Handled`] stops dispatch for that event.

use crate::error::HandlerError;
use async_trait::async_trait;
use faultline_taxonomy::{ErrorCategory, ErrorEvent, InfoEvent, WarningEvent};

/// Result of offering an event to one handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Fully handled; later handlers are skipped
    Handled,
    /// Let the chain continue
    NotHandled,
}

/// What a handler returns
pub type HandlerResult = Result<Disposition, HandlerError>;

/// Pluggable event consumer
///
/// Handlers receive events by shared reference and must treat them as
/// read-only. Only `on_error` is required; warnings and infos are ignored by
/// default.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Name used in logs and dispatch outcomes
    fn name(&self) -> &str;

    /// Higher runs earlier; equal priorities keep insertion order
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this handler wants errors of `category`
    ///
    /// Only consulted for errors; warnings and infos reach every handler.
    fn can_handle(&self, _category: ErrorCategory) -> bool {
        true
    }

    /// Process an error
    async fn on_error(&self, event: &ErrorEvent) -> HandlerResult;

    /// Process a warning
    async fn on_warning(&self, _event: &WarningEvent) -> HandlerResult {
        Ok(Disposition::NotHandled)
    }

    /// Process an info event
    async fn on_info(&self, _event: &InfoEvent) -> HandlerResult {
        Ok(Disposition::NotHandled)
    }
}

/// How the hub disposed of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Below the minimum severity; not recorded
    Filtered,
    /// Recorded and consumed by the named handler
    Handled {
        /// Name of the handler that returned [`Disposition::Handled`]
        handler: String,
    },
    /// Recorded and offered to every eligible handler
    Unhandled,
}

impl DispatchOutcome {
    /// Whether the event passed the severity filter
    #[inline]
    #[must_use]
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Self::Filtered)
    }

    /// Name of the consuming handler, if any
    #[must_use]
    pub fn handled_by(&self) -> Option<&str> {
        match self {
            Self::Handled { handler } => Some(handler),
            _ => None,
        }
    }
}
