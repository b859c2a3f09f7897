//! Operation tracker
//!
//! Owns the active-operation registry and the bounded history of settled
//! operations. Every operation registered through [`OperationTracker::begin`]
//! leaves the registry exactly once, through [`OperationTracker::finish`],
//! whichever of completion, failure, cancellation or a stale sweep gets
//! there first.

use crate::context::{AsyncOperationContext, OperationId, OperationSpec, OperationState, OperationStats};
use chrono::Utc;
use dashmap::DashMap;
use faultline_hub::{DispatchOutcome, ReportingHub};
use faultline_taxonomy::{ErrorCategory, ErrorEvent, StackTrace, OPERATION_NAME_KEY};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Context key holding the operation ID on failure reports
pub const OPERATION_ID_KEY: &str = "operationId";
/// Context key holding the breadcrumb array on failure reports
pub const BREADCRUMB_KEY: &str = "breadcrumb";
/// Context key holding elapsed milliseconds on failure reports
pub const DURATION_MS_KEY: &str = "durationMs";

/// Default number of settled operations kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

tokio::task_local! {
    /// Names of the wrapped operations enclosing the current poll
    static OPERATION_CHAIN: Vec<String>;
}

/// Tracker configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// When false, wrappers pass values through untouched
    pub enabled: bool,
    /// Settled operations kept in history
    pub history_capacity: usize,
}

impl TrackerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With tracking switched on or off
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With history capacity
    #[inline]
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Registry entry; `guarded` entries belong to a wrapper whose drop guard
/// settles them, so the stale sweep leaves them alone
struct ActiveOperation {
    context: AsyncOperationContext,
    guarded: bool,
}

struct TrackerInner {
    hub: Arc<ReportingHub>,
    config: TrackerConfig,
    active: DashMap<OperationId, ActiveOperation>,
    history: Mutex<VecDeque<AsyncOperationContext>>,
}

/// Tracks wrapped async operations and reports their failures
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct OperationTracker {
    inner: Arc<TrackerInner>,
}

impl OperationTracker {
    /// Create tracker reporting into `hub`
    #[must_use]
    pub fn new(hub: Arc<ReportingHub>, config: TrackerConfig) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                hub,
                config,
                active: DashMap::new(),
                history: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Hub failures are reported to
    #[inline]
    #[must_use]
    pub fn hub(&self) -> &Arc<ReportingHub> {
        &self.inner.hub
    }

    /// Tracker configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> TrackerConfig {
        self.inner.config
    }

    /// Whether wrappers track anything
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }

    /// Register a running operation
    ///
    /// The breadcrumb is the chain of wrapped operations enclosing the caller
    /// on the current task, followed by `spec.name`.
    ///
    /// Operations registered here are eligible for
    /// [`sweep_stale`](Self::sweep_stale) if never finished.
    pub fn begin(&self, spec: impl Into<OperationSpec>) -> AsyncOperationContext {
        self.register(spec.into(), false)
    }

    /// Register an operation settled by an [`OperationGuard`]
    pub(crate) fn begin_guarded(&self, spec: OperationSpec) -> AsyncOperationContext {
        self.register(spec, true)
    }

    fn register(&self, spec: OperationSpec, guarded: bool) -> AsyncOperationContext {
        let mut breadcrumb = current_chain();
        breadcrumb.push(spec.name.clone());

        let context = AsyncOperationContext {
            id: OperationId::new(),
            operation_name: spec.name,
            category: spec.category.unwrap_or(ErrorCategory::Unknown),
            started_at: Utc::now(),
            finished_at: None,
            context: spec.context,
            breadcrumb,
            state: OperationState::Running,
        };

        tracing::trace!(
            operation = %context.operation_name,
            id = %context.id,
            depth = context.breadcrumb.len(),
            guarded,
            "operation started"
        );
        self.inner.active.insert(
            context.id,
            ActiveOperation {
                context: context.clone(),
                guarded,
            },
        );
        context
    }

    /// Settle an operation and move it to history
    ///
    /// Returns `None` if the operation already left the registry.
    pub fn finish(&self, id: OperationId, state: OperationState) -> Option<AsyncOperationContext> {
        let (_, ActiveOperation { mut context, .. }) = self.inner.active.remove(&id)?;
        context.state = state;
        context.finished_at = Some(Utc::now());

        tracing::trace!(
            operation = %context.operation_name,
            id = %context.id,
            %state,
            duration_ms = context.duration_ms(),
            "operation settled"
        );

        let capacity = self.inner.config.history_capacity;
        if capacity > 0 {
            let mut history = self.inner.history.lock();
            while history.len() >= capacity {
                history.pop_front();
            }
            history.push_back(context.clone());
        }
        Some(context)
    }

    /// Cancel operations running for longer than `max_age`
    ///
    /// Reaps operations begun manually and never finished. Operations owned
    /// by `wrap_future`/`wrap_stream` are skipped however long they run.
    /// Returns the IDs that were reaped.
    pub fn sweep_stale(&self, max_age: Duration) -> Vec<OperationId> {
        let now = Utc::now();
        let stale: Vec<OperationId> = self
            .inner
            .active
            .iter()
            .filter(|entry| !entry.guarded)
            .filter(|entry| (now - entry.context.started_at).to_std().unwrap_or_default() > max_age)
            .map(|entry| *entry.key())
            .collect();

        let reaped: Vec<OperationId> = stale
            .into_iter()
            .filter(|id| self.finish(*id, OperationState::Cancelled).is_some())
            .collect();

        if !reaped.is_empty() {
            tracing::warn!(count = reaped.len(), "stale operations cancelled");
        }
        reaped
    }

    /// Breadcrumb for the current task, optionally extended by `extra`
    #[must_use]
    pub fn breadcrumb(&self, extra: Option<&str>) -> Vec<String> {
        let mut chain = current_chain();
        if let Some(name) = extra {
            chain.push(name.to_string());
        }
        chain
    }

    /// Running operations, oldest first
    #[must_use]
    pub fn active_operations(&self) -> Vec<AsyncOperationContext> {
        let mut active: Vec<_> = self.inner.active.iter().map(|e| e.context.clone()).collect();
        active.sort_by_key(|c| (c.started_at, c.id));
        active
    }

    /// Number of running operations
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.active.len()
    }

    /// Settled operations, oldest first
    #[must_use]
    pub fn operation_history(&self) -> Vec<AsyncOperationContext> {
        self.inner.history.lock().iter().cloned().collect()
    }

    /// Drop settled operations; running ones are untouched
    pub fn clear_history(&self) {
        self.inner.history.lock().clear();
    }

    /// Counters over active set and history
    #[must_use]
    pub fn stats(&self) -> OperationStats {
        let mut stats = OperationStats {
            active: self.inner.active.len(),
            ..OperationStats::default()
        };
        for context in self.inner.history.lock().iter() {
            match context.state {
                OperationState::Completed => stats.completed += 1,
                OperationState::Failed => stats.failed += 1,
                OperationState::Cancelled => stats.cancelled += 1,
                OperationState::Running => {}
            }
        }
        stats
    }

    /// Report a failure observed in `context`
    pub(crate) async fn report_failure(
        &self,
        context: &AsyncOperationContext,
        message: String,
        stack: StackTrace,
    ) -> DispatchOutcome {
        let breadcrumb = context.breadcrumb.iter().cloned().map(Value::String).collect::<Vec<_>>();
        let event = ErrorEvent::new(message, context.category)
            .with_stack_trace(stack)
            .with_context_map(context.context.clone())
            .with_context(OPERATION_NAME_KEY, context.operation_name.clone())
            .with_context(OPERATION_ID_KEY, context.id.to_string())
            .with_context(BREADCRUMB_KEY, Value::Array(breadcrumb))
            .with_context(DURATION_MS_KEY, context.duration_ms());
        self.inner.hub.report_error(event).await
    }
}

impl std::fmt::Debug for OperationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTracker")
            .field("config", &self.inner.config)
            .field("active", &self.inner.active.len())
            .field("history", &self.inner.history.lock().len())
            .finish()
    }
}

/// Operation names enclosing the current poll, outermost first
#[must_use]
pub fn current_chain() -> Vec<String> {
    OPERATION_CHAIN.try_with(Clone::clone).unwrap_or_default()
}

/// Run `future` with `chain` as the enclosing-operation breadcrumb
pub(crate) async fn with_chain<F: std::future::Future>(chain: Vec<String>, future: F) -> F::Output {
    OPERATION_CHAIN.scope(chain, future).await
}

/// Settles its operation as cancelled if dropped unsettled
pub(crate) struct OperationGuard {
    tracker: OperationTracker,
    id: Option<OperationId>,
}

impl OperationGuard {
    pub(crate) fn new(tracker: OperationTracker, id: OperationId) -> Self {
        Self {
            tracker,
            id: Some(id),
        }
    }

    pub(crate) fn settle(&mut self, state: OperationState) -> Option<AsyncOperationContext> {
        let id = self.id.take()?;
        self.tracker.finish(id, state)
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(context) = self.tracker.finish(id, OperationState::Cancelled) {
                tracing::debug!(
                    operation = %context.operation_name,
                    id = %context.id,
                    "operation dropped before completion"
                );
            }
        }
    }
}
