//! Testing utilities for the Faultline workspace
//!
//! Shared test handlers, fixtures, and error types.

#![allow(missing_docs)]

use async_trait::async_trait;
use faultline_hub::{Disposition, ErrorHandler, HandlerError, HandlerResult};
use faultline_taxonomy::{ErrorCategory, ErrorEvent, InfoEvent, StackTrace, WarningEvent};
use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered record of handler invocations, shared between handlers
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Handler that appends `"{name}:{message}"` to a shared log
#[derive(Debug, Clone)]
pub struct RecordingHandler {
    name: String,
    priority: i32,
    log: CallLog,
    categories: Option<Vec<ErrorCategory>>,
    disposition: Disposition,
}

impl RecordingHandler {
    pub fn new(name: &str, priority: i32, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            priority,
            log: Arc::clone(log),
            categories: None,
            disposition: Disposition::NotHandled,
        }
    }

    /// Only accept errors of these categories
    pub fn only(mut self, categories: &[ErrorCategory]) -> Self {
        self.categories = Some(categories.to_vec());
        self
    }

    /// Return `Handled`, stopping the chain
    pub fn consuming(mut self) -> Self {
        self.disposition = Disposition::Handled;
        self
    }

    pub fn into_arc(self) -> Arc<dyn ErrorHandler> {
        Arc::new(self)
    }

    fn record(&self, message: &str) -> HandlerResult {
        self.log.lock().push(format!("{}:{}", self.name, message));
        Ok(self.disposition)
    }
}

#[async_trait]
impl ErrorHandler for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, category: ErrorCategory) -> bool {
        self.categories
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&category))
    }

    async fn on_error(&self, event: &ErrorEvent) -> HandlerResult {
        self.record(&event.message)
    }

    async fn on_warning(&self, event: &WarningEvent) -> HandlerResult {
        self.record(&event.message)
    }

    async fn on_info(&self, event: &InfoEvent) -> HandlerResult {
        self.record(&event.message)
    }
}

/// Handler whose every call fails
#[derive(Debug, Clone)]
pub struct FailingHandler {
    pub name: String,
    pub priority: i32,
}

impl FailingHandler {
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            priority,
        }
    }
}

#[async_trait]
impl ErrorHandler for FailingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn on_error(&self, _event: &ErrorEvent) -> HandlerResult {
        Err(HandlerError::failed(&self.name, "sink unavailable"))
    }
}

/// Handler that panics on errors
#[derive(Debug, Clone)]
pub struct PanickingHandler {
    pub priority: i32,
}

#[async_trait]
impl ErrorHandler for PanickingHandler {
    fn name(&self) -> &str {
        "panicking"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn on_error(&self, _event: &ErrorEvent) -> HandlerResult {
        panic!("handler exploded")
    }
}

/// Domain error carrying its own stack trace
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to load user {user_id}")]
pub struct LoadUserError {
    pub user_id: u64,
    pub trace: StackTrace,
}

impl LoadUserError {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            trace: StackTrace::capture(),
        }
    }
}

pub fn network_error(message: &str) -> ErrorEvent {
    ErrorEvent::new(message, ErrorCategory::Network)
}

pub fn cleartext_error() -> ErrorEvent {
    network_error("Connection refused: cleartext http blocked")
}
