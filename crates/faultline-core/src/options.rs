//! Optional inputs to `report_error`

use faultline_taxonomy::{Context, ErrorCategory, StackTrace};
use serde_json::Value;

/// Optional fields of an error report
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Stack trace; none is captured when unset
    pub stack_trace: Option<StackTrace>,
    /// Category; inferred from the message when unset
    pub category: Option<ErrorCategory>,
    /// Extra context
    pub context: Context,
    /// Operation the error belongs to; adds a breadcrumb
    pub operation_name: Option<String>,
    /// Stable error code
    pub error_code: Option<String>,
    /// Suggestion overriding the advice tables
    pub suggestion: Option<String>,
    /// Report at critical severity
    pub critical: bool,
}

impl ReportOptions {
    /// Create empty options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With stack trace
    #[must_use]
    pub fn with_stack_trace(mut self, trace: StackTrace) -> Self {
        self.stack_trace = Some(trace);
        self
    }

    /// With a stack trace captured here
    #[must_use]
    pub fn capture_stack_trace(self) -> Self {
        self.with_stack_trace(StackTrace::capture())
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// With one context entry
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// With context entries merged in
    #[must_use]
    pub fn with_context_map(mut self, context: Context) -> Self {
        self.context.extend(context);
        self
    }

    /// With operation name
    #[must_use]
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// With error code
    #[must_use]
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// With suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// At critical severity
    #[inline]
    #[must_use]
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}
