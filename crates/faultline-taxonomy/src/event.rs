//! Diagnostic events
//!
//! Events are built with consuming `with_*` methods and then shared as
//! `Arc` by the hub; nothing mutates an event after it has been reported.

use crate::category::ErrorCategory;
use crate::severity::ReportSeverity;
use crate::stack::StackTrace;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Insertion-ordered diagnostic metadata
pub type Context = IndexMap<String, Value>;

/// Context key carrying the logical operation name
pub const OPERATION_NAME_KEY: &str = "operationName";

/// Category-specific extra fields for domain errors
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainDetails {
    /// State container failure
    StateManagement {
        /// Kind of state manager (provider, bloc, store, ...)
        state_manager_type: String,
        /// Action or event being processed, if known
        action: Option<String>,
    },
    /// Routing failure
    Navigation {
        /// Route that failed to resolve
        route_path: String,
        /// Arguments passed to the route
        arguments: Option<String>,
    },
    /// Code generation failure
    CodeGeneration {
        /// Source file the generator was reading
        source_file: String,
        /// Generator name
        generator: Option<String>,
    },
    /// Test failure
    Testing {
        /// Test identifier
        test_name: String,
    },
    /// Performance budget overrun
    Performance {
        /// Metric name (frame_time_ms, heap_mb, ...)
        metric: String,
        /// Budget that was exceeded
        threshold: f64,
        /// Observed value
        actual: f64,
    },
    /// Configuration failure
    Configuration {
        /// Offending key
        config_key: String,
    },
}

impl DomainDetails {
    /// The category these details belong to
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StateManagement { .. } => ErrorCategory::StateManagement,
            Self::Navigation { .. } => ErrorCategory::Navigation,
            Self::CodeGeneration { .. } => ErrorCategory::CodeGeneration,
            Self::Testing { .. } => ErrorCategory::Testing,
            Self::Performance { .. } => ErrorCategory::Performance,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }
}

/// An error record
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    /// What went wrong
    pub message: String,
    /// When it was constructed
    pub timestamp: DateTime<Utc>,
    /// Diagnostic metadata
    pub context: Context,
    /// Routing category
    pub category: ErrorCategory,
    /// Caller-supplied remedy
    pub suggestion: Option<String>,
    /// Stable machine-readable code
    pub error_code: Option<String>,
    /// Trace captured where the error originated
    pub stack_trace: Option<StackTrace>,
    /// `Error` unless marked critical
    pub severity: ReportSeverity,
    /// Category-specific extras
    pub details: Option<DomainDetails>,
}

impl ErrorEvent {
    /// Create an error event timestamped now
    #[must_use]
    pub fn new(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            context: Context::new(),
            category,
            suggestion: None,
            error_code: None,
            stack_trace: None,
            severity: ReportSeverity::Error,
            details: None,
        }
    }

    /// Build from domain details; the category follows the details
    #[must_use]
    pub fn from_details(message: impl Into<String>, details: DomainDetails) -> Self {
        let mut event = Self::new(message, details.category());
        event.details = Some(details);
        event
    }

    /// With suggestion
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// With error code
    #[inline]
    #[must_use]
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// With stack trace
    #[inline]
    #[must_use]
    pub fn with_stack_trace(mut self, trace: StackTrace) -> Self {
        self.stack_trace = Some(trace);
        self
    }

    /// With a single context entry
    #[inline]
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge a context map; later keys overwrite earlier ones
    #[must_use]
    pub fn with_context_map(mut self, context: Context) -> Self {
        self.context.extend(context);
        self
    }

    /// With explicit timestamp
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Escalate to [`ReportSeverity::Critical`]
    #[inline]
    #[must_use]
    pub fn critical(mut self) -> Self {
        self.severity = ReportSeverity::Critical;
        self
    }

    /// Operation name from context, if the error came from a tracked operation
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.context.get(OPERATION_NAME_KEY).and_then(Value::as_str)
    }
}

/// A warning record
#[derive(Debug, Clone, Serialize)]
pub struct WarningEvent {
    /// What looks wrong
    pub message: String,
    /// When it was constructed
    pub timestamp: DateTime<Utc>,
    /// Diagnostic metadata
    pub context: Context,
    /// Caller-supplied remedy
    pub suggestion: Option<String>,
}

impl WarningEvent {
    /// Create a warning timestamped now
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            context: Context::new(),
            suggestion: None,
        }
    }

    /// With suggestion
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// With a single context entry
    #[inline]
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge a context map
    #[must_use]
    pub fn with_context_map(mut self, context: Context) -> Self {
        self.context.extend(context);
        self
    }
}

/// An informational record
#[derive(Debug, Clone, Serialize)]
pub struct InfoEvent {
    /// Message text
    pub message: String,
    /// When it was constructed
    pub timestamp: DateTime<Utc>,
    /// Diagnostic metadata
    pub context: Context,
}

impl InfoEvent {
    /// Create an info event timestamped now
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            context: Context::new(),
        }
    }

    /// With a single context entry
    #[inline]
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge a context map
    #[must_use]
    pub fn with_context_map(mut self, context: Context) -> Self {
        self.context.extend(context);
        self
    }
}

/// Discriminant of a [`DiagnosticEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`ErrorEvent`]
    Error,
    /// [`WarningEvent`]
    Warning,
    /// [`InfoEvent`]
    Info,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// Any event flowing through the hub
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    /// Error
    Error(ErrorEvent),
    /// Warning
    Warning(WarningEvent),
    /// Info
    Info(InfoEvent),
}

impl DiagnosticEvent {
    /// Event kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Error(_) => EventKind::Error,
            Self::Warning(_) => EventKind::Warning,
            Self::Info(_) => EventKind::Info,
        }
    }

    /// Effective severity used by the hub's filter
    #[must_use]
    pub fn severity(&self) -> ReportSeverity {
        match self {
            Self::Error(e) => e.severity,
            Self::Warning(_) => ReportSeverity::Warning,
            Self::Info(_) => ReportSeverity::Info,
        }
    }

    /// Message text
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Error(e) => &e.message,
            Self::Warning(w) => &w.message,
            Self::Info(i) => &i.message,
        }
    }

    /// Construction time
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Error(e) => e.timestamp,
            Self::Warning(w) => w.timestamp,
            Self::Info(i) => i.timestamp,
        }
    }

    /// Metadata
    #[must_use]
    pub fn context(&self) -> &Context {
        match self {
            Self::Error(e) => &e.context,
            Self::Warning(w) => &w.context,
            Self::Info(i) => &i.context,
        }
    }

    /// Category; only errors carry one
    #[must_use]
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Error(e) => Some(e.category),
            _ => None,
        }
    }

    /// Suggestion, for kinds that carry one
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Error(e) => e.suggestion.as_deref(),
            Self::Warning(w) => w.suggestion.as_deref(),
            Self::Info(_) => None,
        }
    }
}

impl From<ErrorEvent> for DiagnosticEvent {
    fn from(event: ErrorEvent) -> Self {
        Self::Error(event)
    }
}

impl From<WarningEvent> for DiagnosticEvent {
    fn from(event: WarningEvent) -> Self {
        Self::Warning(event)
    }
}

impl From<InfoEvent> for DiagnosticEvent {
    fn from(event: InfoEvent) -> Self {
        Self::Info(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_builder_sets_fields() {
        let event = ErrorEvent::new("boom", ErrorCategory::Network)
            .with_suggestion("retry")
            .with_error_code("NET-001")
            .with_context(OPERATION_NAME_KEY, "loadUser")
            .critical();

        assert_eq!(event.suggestion.as_deref(), Some("retry"));
        assert_eq!(event.error_code.as_deref(), Some("NET-001"));
        assert_eq!(event.operation_name(), Some("loadUser"));
        assert_eq!(event.severity, ReportSeverity::Critical);
    }

    #[test]
    fn context_preserves_insertion_order() {
        let event = InfoEvent::new("ready")
            .with_context("zeta", 1)
            .with_context("alpha", 2)
            .with_context("mid", 3);
        let keys: Vec<_> = event.context.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn implicit_severities() {
        let warning: DiagnosticEvent = WarningEvent::new("low disk space").into();
        let info: DiagnosticEvent = InfoEvent::new("started").into();
        assert_eq!(warning.severity(), ReportSeverity::Warning);
        assert_eq!(info.severity(), ReportSeverity::Info);
        assert_eq!(warning.category(), None);
    }

    #[test]
    fn details_choose_category() {
        let event = ErrorEvent::from_details(
            "no route",
            DomainDetails::Navigation {
                route_path: "/settings".into(),
                arguments: None,
            },
        );
        assert_eq!(event.category, ErrorCategory::Navigation);
    }

    #[test]
    fn serializes_with_type_tag() {
        let event: DiagnosticEvent = WarningEvent::new("careful").with_context("k", "v").into();
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("warning"));
        assert_eq!(value["context"]["k"], json!("v"));
    }
}
