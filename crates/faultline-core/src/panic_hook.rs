//! Panic hook sink
//!
//! One process-wide hook forwards every panic to the hubs of all
//! orchestrators currently holding a [`PanicHookGuard`], then to the hook
//! that was installed before it. When the last guard drops, the previous
//! hook is put back.
//!
//! Panics raised while the hub polls a handler are skipped; dispatch already
//! contains and logs them.
//!
//! Panics are recorded with [`ReportingHub::record_error_sync`]: no handler
//! dispatch and no task spawning happen inside the hook.

use faultline_hub::{in_handler_dispatch, ReportingHub};
use faultline_taxonomy::{ErrorCategory, ErrorEvent, StackTrace};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::PanicHookInfo;
use std::sync::{Arc, Weak};
use std::time::Duration;

type Hook = Arc<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Context key marking panic reports
pub const PANIC_KEY: &str = "panic";
/// Context key holding `file:line:column` of the panic
pub const LOCATION_KEY: &str = "location";
/// Context key holding the panicking thread's name
pub const THREAD_KEY: &str = "thread";

#[derive(Default)]
struct Registry {
    next_token: u64,
    sinks: Vec<(u64, Weak<ReportingHub>)>,
    previous: Option<Hook>,
}

static REGISTRY: Lazy<Mutex<Registry>> = Lazy::new(|| Mutex::new(Registry::default()));

/// Keeps a hub registered as panic sink; unregisters on drop
#[derive(Debug)]
pub struct PanicHookGuard {
    token: u64,
}

/// Register `hub` as a panic sink
///
/// Installs the process-wide hook if no other sink is registered.
pub fn install(hub: &Arc<ReportingHub>) -> PanicHookGuard {
    let mut registry = REGISTRY.lock();
    if registry.sinks.is_empty() {
        let previous: Hook = Arc::from(std::panic::take_hook());
        registry.previous = Some(Arc::clone(&previous));
        std::panic::set_hook(Box::new(move |info| {
            record_panic(info);
            previous(info);
        }));
        tracing::debug!("panic hook installed");
    }

    registry.next_token += 1;
    let token = registry.next_token;
    registry.sinks.push((token, Arc::downgrade(hub)));
    PanicHookGuard { token }
}

/// Number of registered sinks
#[must_use]
pub fn sink_count() -> usize {
    REGISTRY.lock().sinks.len()
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        let mut registry = REGISTRY.lock();
        registry.sinks.retain(|(token, _)| *token != self.token);
        // set_hook panics on a panicking thread; the installed hook then
        // stays as a pass-through until the next registration
        if registry.sinks.is_empty() && !std::thread::panicking() {
            if let Some(previous) = registry.previous.take() {
                let _ours = std::panic::take_hook();
                std::panic::set_hook(Box::new(move |info| previous(info)));
                tracing::debug!("panic hook restored");
            }
        }
    }
}

fn record_panic(info: &PanicHookInfo<'_>) {
    // handler panics are caught and logged by dispatch, never re-reported
    if in_handler_dispatch() {
        return;
    }
    let hubs: Vec<Arc<ReportingHub>> = {
        let Some(registry) = REGISTRY.try_lock_for(Duration::from_millis(50)) else {
            return;
        };
        registry.sinks.iter().filter_map(|(_, hub)| hub.upgrade()).collect()
    };
    if hubs.is_empty() {
        return;
    }

    let event = panic_event(info);
    for hub in hubs {
        hub.record_error_sync(event.clone());
    }
}

fn panic_event(info: &PanicHookInfo<'_>) -> ErrorEvent {
    let message = payload_message(info.payload());
    let thread = std::thread::current();

    let mut event = ErrorEvent::new(message.clone(), ErrorCategory::infer(&message))
        .with_stack_trace(StackTrace::capture())
        .with_context(PANIC_KEY, true)
        .with_context(THREAD_KEY, thread.name().unwrap_or("<unnamed>"))
        .critical();
    if let Some(location) = info.location() {
        event = event.with_context(LOCATION_KEY, location.to_string());
    }
    event
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_taxonomy::{DiagnosticEvent, ReportSeverity};

    #[test]
    fn payload_messages() {
        assert_eq!(payload_message(&"static"), "static");
        assert_eq!(payload_message(&String::from("owned")), "owned");
        assert_eq!(payload_message(&42_u8), "panic with non-string payload");
    }

    #[test]
    fn panics_reach_registered_hub() {
        let hub = Arc::new(ReportingHub::default());
        let guard = install(&hub);

        let result = std::panic::catch_unwind(|| panic!("index out of range in parser"));
        assert!(result.is_err());

        let panics: Vec<_> = hub
            .history()
            .into_iter()
            .filter_map(|event| match event {
                DiagnosticEvent::Error(error) if error.context.contains_key(PANIC_KEY) => {
                    Some(error)
                }
                _ => None,
            })
            .collect();
        assert_eq!(panics.len(), 1);
        assert_eq!(panics[0].message, "index out of range in parser");
        assert_eq!(panics[0].severity, ReportSeverity::Critical);
        assert!(panics[0].context.contains_key(LOCATION_KEY));

        drop(guard);
        let before = hub.statistics().total_errors;
        let _ = std::panic::catch_unwind(|| panic!("after dispose"));
        assert_eq!(hub.statistics().total_errors, before);
    }
}
