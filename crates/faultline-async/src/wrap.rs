//! Future and stream wrappers
//!
//! Wrapped operations register on first poll, run with their breadcrumb in
//! scope, report every error they yield to the hub and hand the original
//! value back to the caller unchanged.

use crate::context::{AsyncOperationContext, OperationSpec, OperationState};
use crate::tracker::{with_chain, OperationGuard, OperationTracker};
use faultline_taxonomy::StackTrace;
use futures::stream::{self, Stream, StreamExt};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;

impl OperationTracker {
    /// Track `future` as operation `spec`
    ///
    /// On `Err` the failure is reported to the hub with the operation's name,
    /// ID, breadcrumb, duration and context before the same error is
    /// returned. Dropping the wrapper before it resolves settles the
    /// operation as cancelled.
    pub fn wrap_future<F, T, E>(
        &self,
        future: F,
        spec: impl Into<OperationSpec>,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let tracker = self.clone();
        let spec = spec.into();
        async move {
            if !tracker.is_enabled() {
                return future.await;
            }

            let started = tracker.begin_guarded(spec);
            let mut guard = OperationGuard::new(tracker.clone(), started.id);
            let result = with_chain(started.breadcrumb.clone(), future).await;

            match result {
                Ok(value) => {
                    guard.settle(OperationState::Completed);
                    Ok(value)
                }
                Err(error) => {
                    let stack = StackTrace::capture();
                    let message = error.to_string();
                    let settled = guard.settle(OperationState::Failed);
                    let context = failed_context(settled, started);
                    tracker.report_failure(&context, message, stack).await;
                    Err(error)
                }
            }
        }
    }

    /// Track `stream` as operation `spec`
    ///
    /// The operation starts on first poll and settles when the stream ends:
    /// failed if any item was an error, completed otherwise. Every `Err`
    /// item is reported and then yielded unchanged; the stream is not
    /// terminated by it.
    pub fn wrap_stream<S, T, E>(
        &self,
        stream: S,
        spec: impl Into<OperationSpec>,
    ) -> impl Stream<Item = Result<T, E>>
    where
        S: Stream<Item = Result<T, E>>,
        E: Display,
    {
        let state = StreamState {
            inner: Box::pin(stream),
            tracker: self.clone(),
            spec: Some(spec.into()),
            started: None,
            guard: None,
            saw_error: false,
        };

        stream::unfold(state, |mut state| async move {
            if !state.tracker.is_enabled() {
                let item = state.inner.next().await?;
                return Some((item, state));
            }

            if state.started.is_none() {
                let spec = state.spec.take()?;
                let started = state.tracker.begin_guarded(spec);
                state.guard = Some(OperationGuard::new(state.tracker.clone(), started.id));
                state.started = Some(started);
            }
            let started = state.started.clone()?;

            match with_chain(started.breadcrumb.clone(), state.inner.next()).await {
                Some(Ok(value)) => Some((Ok(value), state)),
                Some(Err(error)) => {
                    state.saw_error = true;
                    let stack = StackTrace::capture();
                    state
                        .tracker
                        .report_failure(&started, error.to_string(), stack)
                        .await;
                    Some((Err(error), state))
                }
                None => {
                    let outcome = if state.saw_error {
                        OperationState::Failed
                    } else {
                        OperationState::Completed
                    };
                    if let Some(guard) = state.guard.as_mut() {
                        guard.settle(outcome);
                    }
                    None
                }
            }
        })
    }
}

struct StreamState<S> {
    inner: Pin<Box<S>>,
    tracker: OperationTracker,
    spec: Option<OperationSpec>,
    started: Option<AsyncOperationContext>,
    guard: Option<OperationGuard>,
    saw_error: bool,
}

/// Context to report: the settled record, or the start snapshot if the
/// record already left the registry
fn failed_context(
    settled: Option<AsyncOperationContext>,
    started: AsyncOperationContext,
) -> AsyncOperationContext {
    settled.unwrap_or(AsyncOperationContext {
        state: OperationState::Failed,
        ..started
    })
}
