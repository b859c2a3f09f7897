//! Shared stack trace handle
//!
//! A [`StackTrace`] is reference-counted so it can travel with an event,
//! be cloned into snapshots, and still be compared by identity.

use serde::{Serialize, Serializer};
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
enum Frames {
    Captured(Backtrace),
    Text(String),
}

/// Immutable, cheaply clonable stack trace
#[derive(Debug, Clone)]
pub struct StackTrace {
    inner: Arc<Frames>,
}

impl StackTrace {
    /// Capture the current thread's stack
    ///
    /// Frames are only resolved when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`
    /// allows it; otherwise the trace renders as "disabled backtrace".
    #[must_use]
    pub fn capture() -> Self {
        Self {
            inner: Arc::new(Frames::Captured(Backtrace::capture())),
        }
    }

    /// Wrap an already-rendered trace (e.g. from a foreign runtime)
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Frames::Text(text.into())),
        }
    }

    /// Whether this trace was captured in-process
    #[inline]
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(*self.inner, Frames::Captured(_))
    }

    /// Identity comparison: both handles point at the same trace
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &StackTrace) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Rendered trace text
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner {
            Frames::Captured(bt) => write!(f, "{bt}"),
            Frames::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for StackTrace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let trace = StackTrace::from_text("#0 main");
        let clone = trace.clone();
        assert!(trace.ptr_eq(&clone));
        assert!(!trace.ptr_eq(&StackTrace::from_text("#0 main")));
    }

    #[test]
    fn text_trace_renders_verbatim() {
        let trace = StackTrace::from_text("#0 loadUser\n#1 main");
        assert_eq!(trace.render(), "#0 loadUser\n#1 main");
        assert!(!trace.is_captured());
        assert_eq!(
            serde_json::to_string(&trace).unwrap(),
            "\"#0 loadUser\\n#1 main\""
        );
    }
}
