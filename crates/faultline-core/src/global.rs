//! Process-wide orchestrator
//!
//! A single injection point with explicit lifecycle. Libraries and tests
//! that can pass an orchestrator around should construct their own
//! [`DiagnosticsOrchestrator`] instead.

use crate::config::DiagnosticsConfig;
use crate::error::DiagnosticsError;
use crate::orchestrator::DiagnosticsOrchestrator;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static INSTANCE: Lazy<RwLock<Option<Arc<DiagnosticsOrchestrator>>>> =
    Lazy::new(|| RwLock::new(None));

/// Create and initialize the process-wide orchestrator
///
/// If one is already installed it is returned unchanged and `config` is
/// ignored.
pub fn initialize(config: DiagnosticsConfig) -> Result<Arc<DiagnosticsOrchestrator>, DiagnosticsError> {
    let mut slot = INSTANCE.write();
    if let Some(existing) = slot.as_ref() {
        return Ok(Arc::clone(existing));
    }

    let orchestrator = Arc::new(DiagnosticsOrchestrator::new(config));
    orchestrator.initialize()?;
    *slot = Some(Arc::clone(&orchestrator));
    Ok(orchestrator)
}

/// The process-wide orchestrator
pub fn instance() -> Result<Arc<DiagnosticsOrchestrator>, DiagnosticsError> {
    INSTANCE
        .read()
        .as_ref()
        .map(Arc::clone)
        .ok_or(DiagnosticsError::NotInitialized)
}

/// The process-wide orchestrator, initialized with defaults on first use
pub fn get_or_initialize() -> Result<Arc<DiagnosticsOrchestrator>, DiagnosticsError> {
    match instance() {
        Ok(orchestrator) => Ok(orchestrator),
        Err(_) => initialize(DiagnosticsConfig::default()),
    }
}

/// Whether a process-wide orchestrator is installed
#[must_use]
pub fn is_initialized() -> bool {
    INSTANCE.read().is_some()
}

/// Dispose and uninstall the process-wide orchestrator
///
/// A later [`initialize`] creates a fresh instance.
pub fn dispose() -> Result<(), DiagnosticsError> {
    let orchestrator = INSTANCE
        .write()
        .take()
        .ok_or(DiagnosticsError::NotInitialized)?;
    orchestrator.dispose();
    Ok(())
}
