//! Enhancer handler
//!
//! Highest-priority built-in handler. For every event it derives a
//! category elaboration, a suggestion, and at most one piece of advice for
//! the platform it is running on, then logs the result. It never consumes
//! events.

use crate::advice::{elaboration, lookup_suggestion};
use crate::handler::{Disposition, ErrorHandler, HandlerResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use faultline_detector::PlatformIssueDetector;
use faultline_taxonomy::{
    ErrorCategory, ErrorEvent, EventKind, PlatformTag, StackTrace, WarningEvent,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

/// Priority of the enhancer; above every other built-in handler
pub const ENHANCER_PRIORITY: i32 = 1_000;

/// Default number of enhanced reports kept
pub const DEFAULT_RECENT_CAPACITY: usize = 50;

/// Operator-facing rendering of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedReport {
    /// Source event kind
    pub kind: EventKind,
    /// Category (inferred for warnings)
    pub category: ErrorCategory,
    /// Message as reported
    pub original_message: String,
    /// Message with the category elaboration appended
    pub message: String,
    /// Event's own suggestion, else table lookup
    pub suggestion: String,
    /// First matching issue's solution for the enhancer's platform
    pub platform_advice: Option<String>,
    /// Operation the event came from, if tracked
    pub operation_name: Option<String>,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

impl EnhancedReport {
    /// Multi-line operator rendering
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("[{}] {}\n  Suggestion: {}", self.category.label(), self.message, self.suggestion);
        if let Some(advice) = &self.platform_advice {
            out.push_str("\n  Platform: ");
            out.push_str(advice);
        }
        if let Some(operation) = &self.operation_name {
            out.push_str("\n  Operation: ");
            out.push_str(operation);
        }
        out
    }
}

/// Enrichment handler
#[derive(Debug)]
pub struct Enhancer {
    detector: PlatformIssueDetector,
    platform: PlatformTag,
    capacity: usize,
    recent: Mutex<VecDeque<EnhancedReport>>,
}

impl Enhancer {
    /// Create enhancer for the current platform
    #[must_use]
    pub fn new() -> Self {
        Self::for_platform(PlatformTag::current())
    }

    /// Create enhancer that advises for `platform`
    #[must_use]
    pub fn for_platform(platform: PlatformTag) -> Self {
        Self {
            detector: PlatformIssueDetector::new(),
            platform,
            capacity: DEFAULT_RECENT_CAPACITY,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// With recent-report buffer capacity
    #[inline]
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Platform advice is drawn for
    #[inline]
    #[must_use]
    pub fn platform(&self) -> PlatformTag {
        self.platform
    }

    /// Derive the enhanced rendering of an error
    #[must_use]
    pub fn enhance(&self, event: &ErrorEvent) -> EnhancedReport {
        let stack = event.stack_trace.as_ref().map(StackTrace::render);
        let platform_advice = self
            .detector
            .analyze_for(self.platform, &event.message, stack.as_deref(), Some(event.category))
            .into_iter()
            .next()
            .map(|issue| issue.solution);

        EnhancedReport {
            kind: EventKind::Error,
            category: event.category,
            original_message: event.message.clone(),
            message: elaborate(&event.message, event.category),
            suggestion: event
                .suggestion
                .clone()
                .unwrap_or_else(|| lookup_suggestion(event.category, &event.message).to_string()),
            platform_advice,
            operation_name: event.operation_name().map(str::to_string),
            timestamp: event.timestamp,
        }
    }

    /// Derive the enhanced rendering of a warning
    ///
    /// Warnings carry no category, so one is inferred from the message.
    #[must_use]
    pub fn enhance_warning(&self, event: &WarningEvent) -> EnhancedReport {
        let category = ErrorCategory::infer(&event.message);
        let platform_advice = self
            .detector
            .analyze_for(self.platform, &event.message, None, Some(category))
            .into_iter()
            .next()
            .map(|issue| issue.solution);

        EnhancedReport {
            kind: EventKind::Warning,
            category,
            original_message: event.message.clone(),
            message: elaborate(&event.message, category),
            suggestion: event
                .suggestion
                .clone()
                .unwrap_or_else(|| lookup_suggestion(category, &event.message).to_string()),
            platform_advice,
            operation_name: None,
            timestamp: event.timestamp,
        }
    }

    /// Buffered reports, oldest first
    #[must_use]
    pub fn recent_reports(&self) -> Vec<EnhancedReport> {
        self.recent.lock().iter().cloned().collect()
    }

    /// Drop buffered reports
    pub fn clear(&self) {
        self.recent.lock().clear();
    }

    fn remember(&self, report: EnhancedReport) {
        if self.capacity == 0 {
            return;
        }
        let mut recent = self.recent.lock();
        while recent.len() >= self.capacity {
            recent.pop_front();
        }
        recent.push_back(report);
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new()
    }
}

fn elaborate(message: &str, category: ErrorCategory) -> String {
    format!("{message}\n  {}: {}", category.label(), elaboration(category))
}

#[async_trait]
impl ErrorHandler for Enhancer {
    fn name(&self) -> &str {
        "enhancer"
    }

    fn priority(&self) -> i32 {
        ENHANCER_PRIORITY
    }

    async fn on_error(&self, event: &ErrorEvent) -> HandlerResult {
        let report = self.enhance(event);
        tracing::error!(
            category = %report.category,
            operation = report.operation_name.as_deref().unwrap_or("-"),
            suggestion = %report.suggestion,
            platform_advice = report.platform_advice.as_deref().unwrap_or("-"),
            "{}",
            report.message
        );
        self.remember(report);
        Ok(Disposition::NotHandled)
    }

    async fn on_warning(&self, event: &WarningEvent) -> HandlerResult {
        let report = self.enhance_warning(event);
        tracing::warn!(
            category = %report.category,
            suggestion = %report.suggestion,
            "{}",
            report.message
        );
        self.remember(report);
        Ok(Disposition::NotHandled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::ReportingHub;
    use std::sync::Arc;

    #[test]
    fn own_suggestion_takes_precedence() {
        let enhancer = Enhancer::for_platform(PlatformTag::Linux);
        let event = ErrorEvent::new("timeout talking to api", ErrorCategory::Network)
            .with_suggestion("Call the on-call");
        assert_eq!(enhancer.enhance(&event).suggestion, "Call the on-call");
    }

    #[test]
    fn table_lookup_then_generic_fallback() {
        let enhancer = Enhancer::for_platform(PlatformTag::Linux);
        let matched = enhancer.enhance(&ErrorEvent::new(
            "Could not find route /settings",
            ErrorCategory::Navigation,
        ));
        assert_eq!(matched.suggestion, "Register the route or add an unknown-route fallback.");

        let fallback = enhancer.enhance(&ErrorEvent::new("odd", ErrorCategory::Navigation));
        assert_eq!(
            fallback.suggestion,
            "Verify the route table and the arguments passed to it."
        );
    }

    #[test]
    fn elaboration_is_appended() {
        let enhancer = Enhancer::for_platform(PlatformTag::Linux);
        let report = enhancer.enhance(&ErrorEvent::new("bad input", ErrorCategory::Validation));
        assert!(report.message.starts_with("bad input\n"));
        assert!(report.message.contains("Validation:"));
        assert_eq!(report.original_message, "bad input");
    }

    #[test]
    fn platform_advice_only_for_own_platform() {
        let event = ErrorEvent::new(
            "Connection refused: cleartext http blocked",
            ErrorCategory::Network,
        );

        let android = Enhancer::for_platform(PlatformTag::Android).enhance(&event);
        assert!(android
            .platform_advice
            .as_deref()
            .is_some_and(|advice| advice.contains("network_security_config")));

        let linux = Enhancer::for_platform(PlatformTag::Linux).enhance(&event);
        assert_eq!(linux.platform_advice, None);
    }

    #[tokio::test]
    async fn never_consumes_and_remembers_reports() {
        let hub = ReportingHub::default();
        let enhancer = Arc::new(Enhancer::for_platform(PlatformTag::Linux).with_capacity(2));
        hub.add_error_handler(enhancer.clone());

        for i in 0..3 {
            let outcome = hub
                .report_error(ErrorEvent::new(format!("e{i}"), ErrorCategory::Unknown))
                .await;
            assert_eq!(outcome.handled_by(), None);
        }

        let recent = enhancer.recent_reports();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].original_message, "e1");
        enhancer.clear();
        assert!(enhancer.recent_reports().is_empty());
    }

    #[test]
    fn warnings_get_inferred_category() {
        let enhancer = Enhancer::for_platform(PlatformTag::Linux);
        let report = enhancer.enhance_warning(&WarningEvent::new("slow frame detected"));
        assert_eq!(report.kind, EventKind::Warning);
        assert_eq!(report.category, ErrorCategory::Performance);
    }

    #[test]
    fn render_includes_operation() {
        let enhancer = Enhancer::for_platform(PlatformTag::Linux);
        let report = enhancer.enhance(
            &ErrorEvent::new("boom", ErrorCategory::Unknown)
                .with_context(faultline_taxonomy::OPERATION_NAME_KEY, "loadUser"),
        );
        assert!(report.render().contains("Operation: loadUser"));
    }
}
