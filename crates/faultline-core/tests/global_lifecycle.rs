//! Tests for the process-wide orchestrator.
//!
//! The global instance is shared by every test in this binary, so the whole
//! lifecycle runs in one test:
//! - `instance()` before `initialize` is an error
//! - `initialize` is idempotent and returns the same instance
//! - panics are recorded while installed
//! - `dispose` uninstalls; re-initializing yields a fresh instance

use faultline_core::panic_hook::{self, PANIC_KEY};
use faultline_core::{global, DiagnosticsConfig, DiagnosticsError, ReportOptions};
use faultline_taxonomy::DiagnosticEvent;
use std::sync::Arc;

#[tokio::test]
async fn global_lifecycle() {
    assert!(matches!(global::instance(), Err(DiagnosticsError::NotInitialized)));
    assert!(matches!(global::dispose(), Err(DiagnosticsError::NotInitialized)));

    let first = global::initialize(DiagnosticsConfig::default()).unwrap();
    let again = global::initialize(DiagnosticsConfig::default().with_trace_events(true)).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert!(Arc::ptr_eq(&first, &global::instance().unwrap()));
    assert!(first.is_initialized());
    assert_eq!(panic_hook::sink_count(), 1);

    first
        .report_error("global failure", ReportOptions::new())
        .await;
    let _ = std::panic::catch_unwind(|| panic!("worker thread crashed"));

    let history = first.hub().history();
    assert_eq!(history.len(), 2);
    let DiagnosticEvent::Error(panic_event) = &history[1] else {
        panic!("expected panic to be recorded as error");
    };
    assert_eq!(panic_event.context[PANIC_KEY], true);

    global::dispose().unwrap();
    assert!(first.is_disposed());
    assert!(!global::is_initialized());
    assert_eq!(panic_hook::sink_count(), 0);

    let second = global::get_or_initialize().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(second.is_initialized());
    assert!(second.hub().history().is_empty());

    global::dispose().unwrap();
}
