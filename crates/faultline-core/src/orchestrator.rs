//! Diagnostics orchestrator
//!
//! The composition root of the pipeline:
//! - owns one reporting hub, operation tracker, detector and enhancer
//! - wires the built-in handlers on `initialize`
//! - builds error events from raw messages and options
//! - exposes system diagnostics, snapshots and a lifecycle channel

use crate::config::DiagnosticsConfig;
use crate::diagnostics::{DiagnosticSnapshot, SystemDiagnostics, SNAPSHOT_EVENT_LIMIT};
use crate::error::DiagnosticsError;
use crate::lifecycle::LifecycleEvent;
use crate::options::ReportOptions;
use crate::panic_hook::{self, PanicHookGuard};
use chrono::Utc;
use faultline_async::{OperationSpec, OperationTracker, BREADCRUMB_KEY};
use faultline_detector::PlatformIssueDetector;
use faultline_hub::{
    Broadcaster, DispatchOutcome, Enhancer, ErrorHandler, EventSubscription, ReportingHub,
    TracingHandler,
};
use faultline_taxonomy::{
    ErrorCategory, ErrorEvent, InfoEvent, StackTrace, WarningEvent, OPERATION_NAME_KEY,
};
use futures::Stream;
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

/// Context key holding detected platform issues
pub const PLATFORM_ISSUES_KEY: &str = "platformIssues";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Initialized,
    Disposed,
}

/// Composition root and external API of the diagnostics pipeline
pub struct DiagnosticsOrchestrator {
    config: DiagnosticsConfig,
    hub: Arc<ReportingHub>,
    tracker: OperationTracker,
    detector: PlatformIssueDetector,
    enhancer: Arc<Enhancer>,
    lifecycle: Broadcaster<LifecycleEvent>,
    phase: Mutex<Phase>,
    panic_guard: Mutex<Option<PanicHookGuard>>,
}

impl DiagnosticsOrchestrator {
    /// Create orchestrator with its own hub
    #[must_use]
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self::with_hub(config, Arc::new(ReportingHub::new(config.hub_config())))
    }

    /// Create orchestrator around an injected hub
    ///
    /// The hub's minimum severity is replaced by the configured one on
    /// `initialize`.
    #[must_use]
    pub fn with_hub(config: DiagnosticsConfig, hub: Arc<ReportingHub>) -> Self {
        Self {
            tracker: OperationTracker::new(Arc::clone(&hub), config.tracker_config()),
            detector: PlatformIssueDetector::new(),
            enhancer: Arc::new(
                Enhancer::for_platform(config.effective_platform())
                    .with_capacity(config.recent_report_capacity),
            ),
            lifecycle: Broadcaster::new(config.channel_capacity),
            phase: Mutex::new(Phase::Created),
            panic_guard: Mutex::new(None),
            config,
            hub,
        }
    }

    /// Wire handlers, severity filter and panic sink
    ///
    /// Returns `Ok(false)` if already initialized.
    pub fn initialize(&self) -> Result<bool, DiagnosticsError> {
        {
            let mut phase = self.phase.lock();
            match *phase {
                Phase::Initialized => return Ok(false),
                Phase::Disposed => return Err(DiagnosticsError::Disposed),
                Phase::Created => *phase = Phase::Initialized,
            }
        }

        self.hub.set_minimum_severity(self.config.minimum_severity);
        self.hub
            .add_error_handler(Arc::clone(&self.enhancer) as Arc<dyn ErrorHandler>);
        if self.config.trace_events {
            self.hub.add_error_handler(Arc::new(TracingHandler::new()));
        }
        if self.config.install_panic_hook {
            *self.panic_guard.lock() = Some(panic_hook::install(&self.hub));
        }

        tracing::info!(
            platform = %self.enhancer.platform(),
            minimum_severity = %self.config.minimum_severity,
            detection = self.config.enable_platform_detection,
            async_tracking = self.config.enable_async_tracking,
            "diagnostics initialized"
        );
        self.lifecycle
            .publish(Arc::new(LifecycleEvent::Initialized { at: Utc::now() }));
        Ok(true)
    }

    /// Whether `initialize` ran and `dispose` did not
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        *self.phase.lock() == Phase::Initialized
    }

    /// Whether `dispose` ran
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        *self.phase.lock() == Phase::Disposed
    }

    /// Report an error
    ///
    /// The category comes from `options` or is inferred from the message.
    /// A breadcrumb is attached only when an operation name is given.
    /// Reports after `dispose` are dropped and return
    /// [`DispatchOutcome::Filtered`].
    pub async fn report_error(
        &self,
        message: impl Into<String>,
        options: ReportOptions,
    ) -> DispatchOutcome {
        if self.is_disposed() {
            return self.dropped_after_dispose();
        }
        let event = self.build_error(message.into(), options);
        self.submit_error(event).await
    }

    /// Report an already-built error event
    pub async fn report_error_event(&self, event: ErrorEvent) -> DispatchOutcome {
        if self.is_disposed() {
            return self.dropped_after_dispose();
        }
        self.submit_error(event).await
    }

    /// Report a warning
    pub async fn report_warning(&self, event: WarningEvent) -> DispatchOutcome {
        if self.is_disposed() {
            return self.dropped_after_dispose();
        }
        self.hub.report_warning(event).await
    }

    /// Report an info event
    pub async fn report_info(&self, event: InfoEvent) -> DispatchOutcome {
        if self.is_disposed() {
            return self.dropped_after_dispose();
        }
        self.hub.report_info(event).await
    }

    /// Single path for error events: hub dispatch, then the lifecycle notice
    async fn submit_error(&self, event: ErrorEvent) -> DispatchOutcome {
        let message = event.message.clone();
        let category = event.category;
        let outcome = self.hub.report_error(event).await;
        self.lifecycle.publish(Arc::new(LifecycleEvent::error_reported(
            &message, category, &outcome,
        )));
        outcome
    }

    fn dropped_after_dispose(&self) -> DispatchOutcome {
        tracing::debug!(phase = ?*self.phase.lock(), "report after dispose dropped");
        DispatchOutcome::Filtered
    }

    fn build_error(&self, message: String, options: ReportOptions) -> ErrorEvent {
        let category = options
            .category
            .unwrap_or_else(|| ErrorCategory::infer(&message));
        let stack_text = options.stack_trace.as_ref().map(StackTrace::render);

        let issues = if self.config.enable_platform_detection {
            self.detector
                .analyze(&message, stack_text.as_deref(), Some(category))
        } else {
            Vec::new()
        };

        let mut event = ErrorEvent::new(message, category).with_context_map(options.context);
        if let Some(trace) = options.stack_trace {
            event = event.with_stack_trace(trace);
        }
        if let Some(name) = options.operation_name {
            let breadcrumb = self
                .tracker
                .breadcrumb(Some(&name))
                .into_iter()
                .map(Value::String)
                .collect::<Vec<_>>();
            event = event
                .with_context(OPERATION_NAME_KEY, name)
                .with_context(BREADCRUMB_KEY, Value::Array(breadcrumb));
        }
        if !issues.is_empty() {
            match serde_json::to_value(&issues) {
                Ok(value) => event = event.with_context(PLATFORM_ISSUES_KEY, value),
                Err(e) => tracing::warn!("platform issues not attached: {}", e),
            }
        }
        if let Some(code) = options.error_code {
            event = event.with_error_code(code);
        }
        if let Some(suggestion) = options.suggestion {
            event = event.with_suggestion(suggestion);
        }
        if options.critical {
            event = event.critical();
        }
        event
    }

    /// Track `future` and report its failure; see [`OperationTracker::wrap_future`]
    pub fn wrap_future<F, T, E>(
        &self,
        future: F,
        spec: impl Into<OperationSpec>,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.tracker.wrap_future(future, spec)
    }

    /// Track `stream` and report its errors; see [`OperationTracker::wrap_stream`]
    pub fn wrap_stream<S, T, E>(
        &self,
        stream: S,
        spec: impl Into<OperationSpec>,
    ) -> impl Stream<Item = Result<T, E>>
    where
        S: Stream<Item = Result<T, E>>,
        E: Display,
    {
        self.tracker.wrap_stream(stream, spec)
    }

    /// Combined read-only view
    ///
    /// Runs the stale-operation sweep first when a maximum age is configured.
    #[must_use]
    pub fn system_diagnostics(&self) -> SystemDiagnostics {
        if let Some(max_age) = self.config.max_operation_age() {
            self.tracker.sweep_stale(max_age);
        }

        let platform = self.enhancer.platform();
        SystemDiagnostics {
            generated_at: Utc::now(),
            initialized: self.is_initialized(),
            platform,
            statistics: self.hub.statistics(),
            active_operations: self.tracker.active_operations(),
            operation_history: self.tracker.operation_history(),
            operation_stats: self.tracker.stats(),
            recommendations: self.detector.recommendations(platform),
            handlers: self.hub.handler_names(),
            minimum_severity: self.hub.minimum_severity(),
            config: self.config,
        }
    }

    /// Point-in-time bundle of diagnostics and recent events
    #[must_use]
    pub fn capture_snapshot(&self) -> DiagnosticSnapshot {
        let diagnostics = self.system_diagnostics();
        tracing::debug!(
            events = diagnostics.statistics.total_reports,
            active = diagnostics.operation_stats.active,
            "diagnostic snapshot captured"
        );
        DiagnosticSnapshot {
            captured_at: Utc::now(),
            diagnostics,
            recent_events: self.hub.recent_events(SNAPSHOT_EVENT_LIMIT),
            enhanced_reports: self.enhancer.recent_reports(),
        }
    }

    /// Clear hub history, operation history and enhanced reports
    pub fn clear_debugging_data(&self) {
        self.hub.clear_errors();
        self.tracker.clear_history();
        self.enhancer.clear();
        tracing::info!("debugging data cleared");
        self.lifecycle
            .publish(Arc::new(LifecycleEvent::DataCleared { at: Utc::now() }));
    }

    /// Tear down handlers, channels and the panic sink
    ///
    /// Returns `false` if already disposed.
    pub fn dispose(&self) -> bool {
        {
            let mut phase = self.phase.lock();
            if *phase == Phase::Disposed {
                return false;
            }
            *phase = Phase::Disposed;
        }

        self.lifecycle
            .publish(Arc::new(LifecycleEvent::Disposed { at: Utc::now() }));
        self.panic_guard.lock().take();
        self.hub.shutdown();
        self.lifecycle.close();
        tracing::info!("diagnostics disposed");
        true
    }

    /// Lifecycle event subscription
    #[must_use]
    pub fn subscribe_lifecycle(&self) -> EventSubscription<LifecycleEvent> {
        self.lifecycle.subscribe()
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Reporting hub
    #[inline]
    #[must_use]
    pub fn hub(&self) -> &Arc<ReportingHub> {
        &self.hub
    }

    /// Operation tracker
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &OperationTracker {
        &self.tracker
    }

    /// Enhancer handler
    #[inline]
    #[must_use]
    pub fn enhancer(&self) -> &Arc<Enhancer> {
        &self.enhancer
    }

    /// Platform issue detector
    #[inline]
    #[must_use]
    pub fn detector(&self) -> &PlatformIssueDetector {
        &self.detector
    }
}

impl Default for DiagnosticsOrchestrator {
    fn default() -> Self {
        Self::new(DiagnosticsConfig::default())
    }
}

impl std::fmt::Debug for DiagnosticsOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsOrchestrator")
            .field("config", &self.config)
            .field("phase", &*self.phase.lock())
            .field("hub", &self.hub)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_taxonomy::{DiagnosticEvent, PlatformTag, ReportSeverity};
    use pretty_assertions::assert_eq;

    fn config() -> DiagnosticsConfig {
        DiagnosticsConfig::new()
            .with_panic_hook(false)
            .with_platform(PlatformTag::Android)
    }

    fn only_error(orchestrator: &DiagnosticsOrchestrator) -> ErrorEvent {
        let history = orchestrator.hub().history();
        assert_eq!(history.len(), 1);
        match &history[0] {
            DiagnosticEvent::Error(error) => error.clone(),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        assert!(orchestrator.initialize().unwrap());
        assert!(!orchestrator.initialize().unwrap());
        assert_eq!(orchestrator.hub().handler_names(), vec!["enhancer".to_string()]);
    }

    #[test]
    fn trace_events_adds_sink_after_enhancer() {
        let orchestrator = DiagnosticsOrchestrator::new(config().with_trace_events(true));
        orchestrator.initialize().unwrap();
        assert_eq!(orchestrator.hub().handler_names(), vec!["enhancer", "tracing"]);
    }

    #[test]
    fn initialize_after_dispose_fails() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.initialize().unwrap();
        assert!(orchestrator.dispose());
        assert!(!orchestrator.dispose());
        assert!(matches!(orchestrator.initialize(), Err(DiagnosticsError::Disposed)));
    }

    #[tokio::test]
    async fn category_is_inferred() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator
            .report_error("socket timeout while fetching feed", ReportOptions::new())
            .await;
        assert_eq!(only_error(&orchestrator).category, ErrorCategory::Network);
    }

    #[tokio::test]
    async fn breadcrumb_only_with_operation_name() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.report_error("plain", ReportOptions::new()).await;
        assert!(!only_error(&orchestrator).context.contains_key(BREADCRUMB_KEY));

        orchestrator.hub().clear_errors();
        orchestrator
            .report_error("named", ReportOptions::new().with_operation_name("sync"))
            .await;
        let error = only_error(&orchestrator);
        assert_eq!(error.operation_name(), Some("sync"));
        assert_eq!(error.context[BREADCRUMB_KEY], serde_json::json!(["sync"]));
    }

    #[tokio::test]
    async fn platform_issues_attached_when_enabled() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator
            .report_error(
                "Connection refused: cleartext http blocked",
                ReportOptions::new().with_category(ErrorCategory::Network),
            )
            .await;
        let issues = only_error(&orchestrator).context[PLATFORM_ISSUES_KEY].clone();
        assert!(issues.as_array().is_some_and(|list| !list.is_empty()));

        let quiet = DiagnosticsOrchestrator::new(config().with_platform_detection(false));
        quiet
            .report_error(
                "Connection refused: cleartext http blocked",
                ReportOptions::new().with_category(ErrorCategory::Network),
            )
            .await;
        assert!(!only_error(&quiet).context.contains_key(PLATFORM_ISSUES_KEY));
    }

    #[tokio::test]
    async fn options_flow_into_event() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        let trace = StackTrace::from_text("at main.rs:1");
        orchestrator
            .report_error(
                "bad config",
                ReportOptions::new()
                    .with_category(ErrorCategory::Configuration)
                    .with_stack_trace(trace.clone())
                    .with_error_code("CFG001")
                    .with_suggestion("Fix it")
                    .with_context("file", "app.toml")
                    .critical(),
            )
            .await;
        let error = only_error(&orchestrator);
        assert_eq!(error.error_code.as_deref(), Some("CFG001"));
        assert_eq!(error.suggestion.as_deref(), Some("Fix it"));
        assert_eq!(error.severity, ReportSeverity::Critical);
        assert_eq!(error.context["file"], "app.toml");
        assert!(error.stack_trace.as_ref().is_some_and(|t| t.ptr_eq(&trace)));
    }

    #[tokio::test]
    async fn minimum_severity_applied_on_initialize() {
        let orchestrator =
            DiagnosticsOrchestrator::new(config().with_minimum_severity(ReportSeverity::Error));
        orchestrator.initialize().unwrap();
        let outcome = orchestrator
            .report_warning(WarningEvent::new("low disk space"))
            .await;
        assert_eq!(outcome, DispatchOutcome::Filtered);
        assert!(orchestrator.hub().statistics().is_empty());
    }

    #[tokio::test]
    async fn lifecycle_channel_sequence() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        let mut events = orchestrator.subscribe_lifecycle();

        orchestrator.initialize().unwrap();
        orchestrator.report_error("boom", ReportOptions::new()).await;
        orchestrator.clear_debugging_data();
        orchestrator.dispose();

        let mut names = Vec::new();
        while let Some(event) = events.recv().await {
            names.push(event.name());
        }
        assert_eq!(names, vec!["initialized", "error_reported", "data_cleared", "disposed"]);
    }

    #[tokio::test]
    async fn reports_after_dispose_are_dropped() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.initialize().unwrap();
        orchestrator.dispose();
        let outcome = orchestrator.report_error("late", ReportOptions::new()).await;
        assert_eq!(outcome, DispatchOutcome::Filtered);
        let outcome = orchestrator
            .report_error_event(ErrorEvent::new("late event", ErrorCategory::Unknown))
            .await;
        assert_eq!(outcome, DispatchOutcome::Filtered);
        assert!(orchestrator.hub().history().is_empty());
    }

    #[tokio::test]
    async fn both_error_paths_announce_on_lifecycle() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.initialize().unwrap();
        let mut events = orchestrator.subscribe_lifecycle();

        orchestrator
            .report_error(
                "from message",
                ReportOptions::new().with_category(ErrorCategory::Validation),
            )
            .await;
        orchestrator
            .report_error_event(ErrorEvent::new("prebuilt", ErrorCategory::FileSystem))
            .await;

        let mut reported = Vec::new();
        while let Some(event) = events.try_recv() {
            if let LifecycleEvent::ErrorReported { message, category, .. } = event.as_ref() {
                reported.push((message.clone(), *category));
            }
        }
        assert_eq!(
            reported,
            vec![
                ("from message".to_string(), ErrorCategory::Validation),
                ("prebuilt".to_string(), ErrorCategory::FileSystem),
            ]
        );
    }

    #[tokio::test]
    async fn clear_debugging_data_resets_everything() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.initialize().unwrap();
        orchestrator.report_error("boom", ReportOptions::new()).await;
        let _ = orchestrator
            .wrap_future(async { Ok::<_, String>(()) }, "tick")
            .await;
        assert!(!orchestrator.enhancer().recent_reports().is_empty());

        orchestrator.clear_debugging_data();
        let diagnostics = orchestrator.system_diagnostics();
        assert!(diagnostics.statistics.is_empty());
        assert!(diagnostics.operation_history.is_empty());
        assert!(orchestrator.enhancer().recent_reports().is_empty());
    }

    #[tokio::test]
    async fn system_diagnostics_contents() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.initialize().unwrap();
        let _ = orchestrator
            .wrap_future(async { Err::<(), _>("nope") }, "fetch")
            .await;

        let diagnostics = orchestrator.system_diagnostics();
        assert!(diagnostics.initialized);
        assert_eq!(diagnostics.platform, PlatformTag::Android);
        assert_eq!(diagnostics.statistics.total_errors, 1);
        assert_eq!(diagnostics.operation_stats.failed, 1);
        assert!(!diagnostics.recommendations.is_empty());
        assert_eq!(diagnostics.handlers, vec!["enhancer"]);
    }

    #[tokio::test]
    async fn snapshot_serializes() {
        let orchestrator = DiagnosticsOrchestrator::new(config());
        orchestrator.initialize().unwrap();
        orchestrator.report_error("boom", ReportOptions::new()).await;

        let snapshot = orchestrator.capture_snapshot();
        assert_eq!(snapshot.recent_events.len(), 1);
        assert_eq!(snapshot.enhanced_reports.len(), 1);

        let json: Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["recent_events"][0]["message"], "boom");
        assert_eq!(json["diagnostics"]["statistics"]["total_errors"], 1);
    }
}
