//! Reporting hub
//!
//! Ingests events, applies the minimum-severity filter, keeps history and
//! statistics, fans events out on per-kind broadcast channels, and drives
//! them through the handler chain.
//!
//! # Dispatch
//! Handlers run one at a time in descending priority order on the reporting
//! task. A handler returning [`Disposition::Handled`] ends dispatch; a handler
//! that errors or panics is logged and skipped.

use crate::channel::{Broadcaster, EventSubscription, DEFAULT_CHANNEL_CAPACITY};
use crate::error::HandlerError;
use crate::handler::{DispatchOutcome, Disposition, ErrorHandler};
use faultline_taxonomy::{
    DiagnosticEvent, ErrorCategory, ErrorEvent, ErrorStatistics, InfoEvent, ReportSeverity,
    WarningEvent,
};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cell::Cell;
use std::cmp::Reverse;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Hub configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HubConfig {
    /// Events below this severity are dropped
    pub minimum_severity: ReportSeverity,
    /// Buffered events per broadcast subscriber
    pub channel_capacity: usize,
}

impl HubConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With minimum severity
    #[inline]
    #[must_use]
    pub fn with_minimum_severity(mut self, severity: ReportSeverity) -> Self {
        self.minimum_severity = severity;
        self
    }

    /// With channel capacity
    #[inline]
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            minimum_severity: ReportSeverity::Debug,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug)]
struct HubState {
    history: Vec<DiagnosticEvent>,
    statistics: ErrorStatistics,
    minimum_severity: ReportSeverity,
}

/// Borrowed event handed to the dispatch loop
#[derive(Clone, Copy)]
enum EventRef<'a> {
    Error(&'a ErrorEvent),
    Warning(&'a WarningEvent),
    Info(&'a InfoEvent),
}

/// Central ingestion point for diagnostic events
pub struct ReportingHub {
    state: Mutex<HubState>,
    handlers: RwLock<Vec<Arc<dyn ErrorHandler>>>,
    errors: Broadcaster<ErrorEvent>,
    warnings: Broadcaster<WarningEvent>,
    infos: Broadcaster<InfoEvent>,
}

impl ReportingHub {
    /// Create hub
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self {
            state: Mutex::new(HubState {
                history: Vec::new(),
                statistics: ErrorStatistics::new(),
                minimum_severity: config.minimum_severity,
            }),
            handlers: RwLock::new(Vec::new()),
            errors: Broadcaster::new(config.channel_capacity),
            warnings: Broadcaster::new(config.channel_capacity),
            infos: Broadcaster::new(config.channel_capacity),
        }
    }

    /// Report an error and run it through the handler chain
    pub async fn report_error(&self, event: ErrorEvent) -> DispatchOutcome {
        let event = Arc::new(event);
        if !self.ingest(DiagnosticEvent::Error(ErrorEvent::clone(&event)), || {
            self.errors.publish(Arc::clone(&event));
        }) {
            return DispatchOutcome::Filtered;
        }
        self.dispatch(EventRef::Error(&event)).await
    }

    /// Report a warning and run it through the handler chain
    pub async fn report_warning(&self, event: WarningEvent) -> DispatchOutcome {
        let event = Arc::new(event);
        if !self.ingest(DiagnosticEvent::Warning(WarningEvent::clone(&event)), || {
            self.warnings.publish(Arc::clone(&event));
        }) {
            return DispatchOutcome::Filtered;
        }
        self.dispatch(EventRef::Warning(&event)).await
    }

    /// Report an info event and run it through the handler chain
    pub async fn report_info(&self, event: InfoEvent) -> DispatchOutcome {
        let event = Arc::new(event);
        if !self.ingest(DiagnosticEvent::Info(InfoEvent::clone(&event)), || {
            self.infos.publish(Arc::clone(&event));
        }) {
            return DispatchOutcome::Filtered;
        }
        self.dispatch(EventRef::Info(&event)).await
    }

    /// Record and publish an error without handler dispatch
    ///
    /// For synchronous contexts such as a panic hook. Returns whether the
    /// event passed the severity filter.
    pub fn record_error_sync(&self, event: ErrorEvent) -> bool {
        let event = Arc::new(event);
        self.ingest(DiagnosticEvent::Error(ErrorEvent::clone(&event)), || {
            self.errors.publish(Arc::clone(&event));
        })
    }

    /// Filter, store, count and publish under one lock
    ///
    /// Publishing inside the lock keeps channel order identical to history
    /// order when several tasks report at once.
    fn ingest(&self, event: DiagnosticEvent, publish: impl FnOnce()) -> bool {
        let mut state = self.state.lock();
        let severity = event.severity();
        if !severity.passes(state.minimum_severity) {
            tracing::trace!(
                kind = %event.kind(),
                %severity,
                minimum = %state.minimum_severity,
                "event below minimum severity dropped"
            );
            return false;
        }
        state.statistics.record(&event);
        state.history.push(event);
        publish();
        true
    }

    async fn dispatch(&self, event: EventRef<'_>) -> DispatchOutcome {
        let handlers = self.handlers.read().clone();

        for handler in handlers {
            if let EventRef::Error(error) = event {
                if !handler.can_handle(error.category) {
                    continue;
                }
            }

            let mut call = match event {
                EventRef::Error(e) => handler.on_error(e),
                EventRef::Warning(w) => handler.on_warning(w),
                EventRef::Info(i) => handler.on_info(i),
            };
            // Each poll runs inside a dispatch scope so panic sinks can tell
            // handler faults apart from application panics.
            let scoped = futures::future::poll_fn(move |cx| {
                let _scope = DispatchScope::enter();
                call.as_mut().poll(cx)
            });

            let result = match AssertUnwindSafe(scoped).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(HandlerError::Panicked {
                    handler: handler.name().to_string(),
                    message: panic_message(payload.as_ref()),
                }),
            };

            match result {
                Ok(Disposition::Handled) => {
                    tracing::debug!(handler = handler.name(), "event handled; dispatch stopped");
                    return DispatchOutcome::Handled {
                        handler: handler.name().to_string(),
                    };
                }
                Ok(Disposition::NotHandled) => {}
                Err(err) => {
                    // Internal fault: logged only, never re-reported.
                    tracing::error!(
                        handler = handler.name(),
                        error = %err,
                        "diagnostics handler failed; continuing chain"
                    );
                }
            }
        }

        DispatchOutcome::Unhandled
    }

    /// Register handler, keeping the chain sorted by descending priority
    pub fn add_error_handler(&self, handler: Arc<dyn ErrorHandler>) {
        let mut handlers = self.handlers.write();
        tracing::debug!(
            handler = handler.name(),
            priority = handler.priority(),
            "registering diagnostics handler"
        );
        handlers.push(handler);
        // Stable sort: equal priorities keep insertion order.
        handlers.sort_by_key(|h| Reverse(h.priority()));
    }

    /// Unregister a handler by identity; returns whether it was present
    pub fn remove_error_handler(&self, handler: &Arc<dyn ErrorHandler>) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| !Arc::ptr_eq(h, handler));
        handlers.len() != before
    }

    /// Registered handler count
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Handler names in dispatch order
    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .read()
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }

    /// Empty history and reset statistics
    pub fn clear_errors(&self) {
        let mut state = self.state.lock();
        state.history.clear();
        state.statistics = ErrorStatistics::new();
        tracing::debug!("diagnostic history cleared");
    }

    /// Statistics snapshot
    #[must_use]
    pub fn statistics(&self) -> ErrorStatistics {
        self.state.lock().statistics.clone()
    }

    /// History snapshot, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<DiagnosticEvent> {
        self.state.lock().history.clone()
    }

    /// Up to `limit` most recent events, oldest first
    #[must_use]
    pub fn recent_events(&self, limit: usize) -> Vec<DiagnosticEvent> {
        let state = self.state.lock();
        let start = state.history.len().saturating_sub(limit);
        state.history[start..].to_vec()
    }

    /// Recorded errors of one category
    #[must_use]
    pub fn errors_by_category(&self, category: ErrorCategory) -> Vec<ErrorEvent> {
        self.state
            .lock()
            .history
            .iter()
            .filter_map(|event| match event {
                DiagnosticEvent::Error(e) if e.category == category => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Change the filter for subsequent reports
    pub fn set_minimum_severity(&self, severity: ReportSeverity) {
        self.state.lock().minimum_severity = severity;
    }

    /// Current filter
    #[must_use]
    pub fn minimum_severity(&self) -> ReportSeverity {
        self.state.lock().minimum_severity
    }

    /// Subscribe to recorded errors
    #[must_use]
    pub fn subscribe_errors(&self) -> EventSubscription<ErrorEvent> {
        self.errors.subscribe()
    }

    /// Subscribe to recorded warnings
    #[must_use]
    pub fn subscribe_warnings(&self) -> EventSubscription<WarningEvent> {
        self.warnings.subscribe()
    }

    /// Subscribe to recorded infos
    #[must_use]
    pub fn subscribe_infos(&self) -> EventSubscription<InfoEvent> {
        self.infos.subscribe()
    }

    /// Drop every handler and close every channel
    ///
    /// Later reports are still recorded but reach no one.
    pub fn shutdown(&self) {
        self.handlers.write().clear();
        self.errors.close();
        self.warnings.close();
        self.infos.close();
        tracing::debug!("reporting hub shut down");
    }
}

impl Default for ReportingHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl std::fmt::Debug for ReportingHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingHub")
            .field("handlers", &self.handler_names())
            .field("minimum_severity", &self.minimum_severity())
            .finish_non_exhaustive()
    }
}

thread_local! {
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Whether the current thread is polling a handler
///
/// True only while a handler future is being polled by the hub, so a panic
/// hook that sees `true` is observing a handler fault that dispatch will
/// catch and log.
#[must_use]
pub fn in_handler_dispatch() -> bool {
    DISPATCH_DEPTH.with(|depth| depth.get() > 0)
}

/// Marks the current thread as polling a handler until dropped
struct DispatchScope;

impl DispatchScope {
    fn enter() -> Self {
        DISPATCH_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::handler::HandlerResult;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Appends `name` to a shared log, optionally consuming or failing
    struct Probe {
        name: &'static str,
        priority: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
        result: fn() -> HandlerResult,
        only: Option<ErrorCategory>,
    }

    impl Probe {
        fn new(name: &'static str, priority: i32, log: &Arc<Mutex<Vec<&'static str>>>) -> Self {
            Self {
                name,
                priority,
                log: Arc::clone(log),
                result: || Ok(Disposition::NotHandled),
                only: None,
            }
        }

        fn returning(mut self, result: fn() -> HandlerResult) -> Self {
            self.result = result;
            self
        }

        fn only(mut self, category: ErrorCategory) -> Self {
            self.only = Some(category);
            self
        }
    }

    #[async_trait]
    impl ErrorHandler for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn can_handle(&self, category: ErrorCategory) -> bool {
            self.only.map_or(true, |only| only == category)
        }

        async fn on_error(&self, _event: &ErrorEvent) -> HandlerResult {
            self.log.lock().push(self.name);
            (self.result)()
        }

        async fn on_warning(&self, _event: &WarningEvent) -> HandlerResult {
            self.log.lock().push(self.name);
            (self.result)()
        }
    }

    struct Panicker;

    #[async_trait]
    impl ErrorHandler for Panicker {
        fn name(&self) -> &str {
            "panicker"
        }

        fn priority(&self) -> i32 {
            50
        }

        async fn on_error(&self, _event: &ErrorEvent) -> HandlerResult {
            panic!("handler exploded");
        }
    }

    fn log() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn net_error() -> ErrorEvent {
        ErrorEvent::new("socket closed", ErrorCategory::Network)
    }

    #[tokio::test]
    async fn dispatch_follows_descending_priority() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(Probe::new("low", 5, &calls)));
        hub.add_error_handler(Arc::new(Probe::new("high", 10, &calls)));

        let outcome = hub.report_error(net_error()).await;

        assert_eq!(outcome, DispatchOutcome::Unhandled);
        assert_eq!(*calls.lock(), vec!["high", "low"]);
        assert_eq!(hub.handler_names(), vec!["high", "low"]);
    }

    #[tokio::test]
    async fn equal_priority_keeps_insertion_order() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(Probe::new("a", 1, &calls)));
        hub.add_error_handler(Arc::new(Probe::new("b", 1, &calls)));

        hub.report_error(net_error()).await;

        assert_eq!(*calls.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn handled_short_circuits_chain() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(Probe::new("first", 10, &calls)));
        hub.add_error_handler(Arc::new(
            Probe::new("consumer", 5, &calls).returning(|| Ok(Disposition::Handled)),
        ));
        hub.add_error_handler(Arc::new(Probe::new("never", 1, &calls)));

        let outcome = hub.report_error(net_error()).await;

        assert_eq!(outcome.handled_by(), Some("consumer"));
        assert_eq!(*calls.lock(), vec!["first", "consumer"]);
    }

    /// Logs `name:start`, suspends, then logs `name:end`
    struct Staged {
        name: &'static str,
        priority: i32,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ErrorHandler for Staged {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn on_error(&self, _event: &ErrorEvent) -> HandlerResult {
            self.log.lock().push(format!("{}:start", self.name));
            tokio::task::yield_now().await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            self.log.lock().push(format!("{}:end", self.name));
            Ok(Disposition::NotHandled)
        }
    }

    #[tokio::test]
    async fn handlers_run_one_at_a_time() {
        let hub = ReportingHub::default();
        let calls = Arc::new(Mutex::new(Vec::new()));
        for (name, priority) in [("b", 1), ("a", 2)] {
            hub.add_error_handler(Arc::new(Staged {
                name,
                priority,
                log: Arc::clone(&calls),
            }));
        }

        hub.report_error(net_error()).await;

        assert_eq!(*calls.lock(), vec!["a:start", "a:end", "b:start", "b:end"]);
    }

    /// Records whether it was polled inside a dispatch scope
    struct ScopeWitness {
        seen: Arc<Mutex<Vec<bool>>>,
    }

    #[async_trait]
    impl ErrorHandler for ScopeWitness {
        fn name(&self) -> &str {
            "witness"
        }

        fn priority(&self) -> i32 {
            0
        }

        async fn on_error(&self, _event: &ErrorEvent) -> HandlerResult {
            self.seen.lock().push(in_handler_dispatch());
            tokio::task::yield_now().await;
            self.seen.lock().push(in_handler_dispatch());
            Ok(Disposition::NotHandled)
        }
    }

    #[tokio::test]
    async fn handler_polls_are_marked_as_dispatch() {
        let hub = ReportingHub::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        hub.add_error_handler(Arc::new(ScopeWitness {
            seen: Arc::clone(&seen),
        }));
        hub.add_error_handler(Arc::new(Panicker));

        assert!(!in_handler_dispatch());
        hub.report_error(net_error()).await;

        assert_eq!(*seen.lock(), vec![true, true]);
        // the panicking handler unwound through its scope
        assert!(!in_handler_dispatch());
    }

    #[tokio::test]
    async fn failing_and_panicking_handlers_are_contained() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(
            Probe::new("failing", 100, &calls).returning(|| Err(HandlerError::failed("failing", "nope"))),
        ));
        hub.add_error_handler(Arc::new(Panicker));
        hub.add_error_handler(Arc::new(Probe::new("survivor", 1, &calls)));

        let outcome = hub.report_error(net_error()).await;

        assert_eq!(outcome, DispatchOutcome::Unhandled);
        assert_eq!(*calls.lock(), vec!["failing", "survivor"]);
        // The fault is not re-reported as a new event.
        assert_eq!(hub.statistics().total_reports, 1);
    }

    #[tokio::test]
    async fn can_handle_filters_errors_only() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(
            Probe::new("nav-only", 10, &calls).only(ErrorCategory::Navigation),
        ));

        hub.report_error(net_error()).await;
        assert!(calls.lock().is_empty());

        hub.report_warning(WarningEvent::new("slow frame")).await;
        assert_eq!(*calls.lock(), vec!["nav-only"]);
    }

    #[tokio::test]
    async fn below_minimum_is_dropped_silently() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(Probe::new("probe", 1, &calls)));
        let mut warnings = hub.subscribe_warnings();
        hub.set_minimum_severity(ReportSeverity::Error);

        let outcome = hub.report_warning(WarningEvent::new("low disk space")).await;

        assert_eq!(outcome, DispatchOutcome::Filtered);
        assert!(hub.history().is_empty());
        assert_eq!(hub.statistics(), ErrorStatistics::new());
        assert!(calls.lock().is_empty());
        assert!(warnings.try_recv().is_none());
    }

    #[tokio::test]
    async fn minimum_severity_does_not_touch_existing_history() {
        let hub = ReportingHub::default();
        hub.report_info(InfoEvent::new("boot")).await;
        hub.set_minimum_severity(ReportSeverity::Critical);

        assert_eq!(hub.history().len(), 1);
        assert_eq!(hub.report_error(net_error()).await, DispatchOutcome::Filtered);
        assert_eq!(
            hub.report_error(net_error().critical()).await,
            DispatchOutcome::Unhandled
        );
        assert_eq!(hub.history().len(), 2);
    }

    #[tokio::test]
    async fn clear_errors_resets_statistics() {
        let hub = ReportingHub::default();
        let calls = log();
        let probe: Arc<dyn ErrorHandler> = Arc::new(Probe::new("probe", 1, &calls));
        hub.add_error_handler(Arc::clone(&probe));
        let mut errors = hub.subscribe_errors();

        hub.report_error(net_error()).await;
        hub.report_warning(WarningEvent::new("w")).await;
        hub.clear_errors();

        let stats = hub.statistics();
        assert_eq!(stats.total_reports, 0);
        assert_eq!(stats.total_errors, 0);
        assert_eq!(stats.most_common_category, None);
        assert!(hub.history().is_empty());
        // Handlers and channels survive.
        assert_eq!(hub.handler_count(), 1);
        assert!(errors.try_recv().is_some());
        hub.report_error(net_error()).await;
        assert!(errors.try_recv().is_some());
    }

    #[tokio::test]
    async fn remove_handler_by_identity() {
        let hub = ReportingHub::default();
        let calls = log();
        let probe: Arc<dyn ErrorHandler> = Arc::new(Probe::new("probe", 1, &calls));
        hub.add_error_handler(Arc::clone(&probe));

        assert!(hub.remove_error_handler(&probe));
        assert!(!hub.remove_error_handler(&probe));
        hub.report_error(net_error()).await;
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn channels_deliver_in_report_order() {
        let hub = ReportingHub::default();
        let mut errors = hub.subscribe_errors();
        let mut infos = hub.subscribe_infos();

        for i in 0..3 {
            hub.report_error(ErrorEvent::new(format!("e{i}"), ErrorCategory::Unknown))
                .await;
        }
        hub.report_info(InfoEvent::new("i0")).await;

        for i in 0..3 {
            assert_eq!(errors.recv().await.unwrap().message, format!("e{i}"));
        }
        assert_eq!(infos.recv().await.unwrap().message, "i0");
    }

    #[tokio::test]
    async fn shutdown_closes_channels_and_drops_handlers() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(Probe::new("probe", 1, &calls)));
        let mut errors = hub.subscribe_errors();

        hub.shutdown();

        assert_eq!(hub.handler_count(), 0);
        assert!(errors.recv().await.is_none());
        hub.report_error(net_error()).await;
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn record_error_sync_skips_handlers() {
        let hub = ReportingHub::default();
        let calls = log();
        hub.add_error_handler(Arc::new(Probe::new("probe", 1, &calls)));

        assert!(hub.record_error_sync(net_error()));
        assert_eq!(hub.statistics().total_errors, 1);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn recent_events_returns_tail() {
        let hub = ReportingHub::default();
        for i in 0..5 {
            hub.report_info(InfoEvent::new(format!("i{i}"))).await;
        }
        let recent: Vec<_> = hub
            .recent_events(2)
            .iter()
            .map(|e| e.message().to_string())
            .collect();
        assert_eq!(recent, vec!["i3", "i4"]);
        assert_eq!(hub.recent_events(50).len(), 5);
    }

    #[derive(Debug, Clone)]
    enum Report {
        Error(usize),
        Critical,
        Warning,
        Info,
    }

    fn arb_report() -> impl Strategy<Value = Report> {
        prop_oneof![
            (0..ErrorCategory::ALL.len()).prop_map(Report::Error),
            Just(Report::Critical),
            Just(Report::Warning),
            Just(Report::Info),
        ]
    }

    fn arb_severity() -> impl Strategy<Value = ReportSeverity> {
        (0..ReportSeverity::ALL.len()).prop_map(|i| ReportSeverity::ALL[i])
    }

    proptest! {
        #[test]
        fn totals_match_accepted_reports(
            reports in proptest::collection::vec(arb_report(), 0..40),
            minimum in arb_severity(),
        ) {
            let hub = ReportingHub::default();
            hub.set_minimum_severity(minimum);
            let mut accepted = 0usize;

            tokio_test::block_on(async {
                for report in &reports {
                    let outcome = match report {
                        Report::Error(i) => {
                            hub.report_error(ErrorEvent::new("e", ErrorCategory::ALL[*i])).await
                        }
                        Report::Critical => {
                            hub.report_error(ErrorEvent::new("c", ErrorCategory::Unknown).critical())
                                .await
                        }
                        Report::Warning => hub.report_warning(WarningEvent::new("w")).await,
                        Report::Info => hub.report_info(InfoEvent::new("i")).await,
                    };
                    if outcome.is_recorded() {
                        accepted += 1;
                    }
                }
            });

            let stats = hub.statistics();
            prop_assert_eq!(stats.total_reports, accepted);
            prop_assert_eq!(
                stats.total_reports,
                stats.total_errors + stats.total_warnings + stats.total_infos
            );
            prop_assert_eq!(&stats, &ErrorStatistics::from_events(&hub.history()));
        }
    }
}
