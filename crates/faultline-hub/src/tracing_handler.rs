//! Structured log sink
//!
//! Writes each event as one `tracing` record at the matching level.

use crate::handler::{Disposition, ErrorHandler, HandlerResult};
use async_trait::async_trait;
use faultline_taxonomy::{ErrorEvent, InfoEvent, ReportSeverity, WarningEvent};

/// Priority of the tracing sink; runs after everything else built in
pub const TRACING_PRIORITY: i32 = 0;

/// Handler that logs events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHandler;

impl TracingHandler {
    /// Create handler
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ErrorHandler for TracingHandler {
    fn name(&self) -> &str {
        "tracing"
    }

    fn priority(&self) -> i32 {
        TRACING_PRIORITY
    }

    async fn on_error(&self, event: &ErrorEvent) -> HandlerResult {
        let code = event.error_code.as_deref().unwrap_or("-");
        if event.severity == ReportSeverity::Critical {
            tracing::error!(
                target: "faultline",
                critical = true,
                category = %event.category,
                code,
                "{}",
                event.message
            );
        } else {
            tracing::error!(
                target: "faultline",
                category = %event.category,
                code,
                "{}",
                event.message
            );
        }
        Ok(Disposition::NotHandled)
    }

    async fn on_warning(&self, event: &WarningEvent) -> HandlerResult {
        tracing::warn!(target: "faultline", "{}", event.message);
        Ok(Disposition::NotHandled)
    }

    async fn on_info(&self, event: &InfoEvent) -> HandlerResult {
        tracing::info!(target: "faultline", "{}", event.message);
        Ok(Disposition::NotHandled)
    }
}
