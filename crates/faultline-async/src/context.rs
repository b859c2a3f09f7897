//! Operation records
//!
//! One [`AsyncOperationContext`] exists per wrapped operation from the moment
//! it starts until it settles; settled records move to the bounded history.

use chrono::{DateTime, Utc};
use faultline_taxonomy::{Context, ErrorCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

/// Unique operation identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Ulid);

impl OperationId {
    /// Generate new operation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a tracked operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    /// Started and not yet settled
    Running,
    /// Finished with a success value
    Completed,
    /// Finished with an error
    Failed,
    /// Dropped before finishing, or reaped as stale
    Cancelled,
}

impl OperationState {
    /// Whether the operation has settled
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one wrapped asynchronous operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsyncOperationContext {
    /// Operation ID
    pub id: OperationId,
    /// Caller-supplied name
    pub operation_name: String,
    /// Category failures are reported under
    pub category: ErrorCategory,
    /// When the operation started
    pub started_at: DateTime<Utc>,
    /// When the operation settled
    pub finished_at: Option<DateTime<Utc>>,
    /// Caller-supplied context
    pub context: Context,
    /// Enclosing operation names on the same task, outermost first, ending
    /// with this operation
    pub breadcrumb: Vec<String>,
    /// Current state
    pub state: OperationState,
}

impl AsyncOperationContext {
    /// Wall time from start to settlement (or to now, while running)
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Utc::now) - self.started_at
    }

    /// Duration in whole milliseconds, clamped at zero
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration().num_milliseconds()).unwrap_or(0)
    }
}

/// Description of an operation about to be wrapped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSpec {
    /// Operation name
    pub name: String,
    /// Failure category; `Unknown` when unset
    pub category: Option<ErrorCategory>,
    /// Extra context attached to failure reports
    pub context: Context,
}

impl OperationSpec {
    /// Create spec with a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With failure category
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
}

impl From<&str> for OperationSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OperationSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Counters over the active set and the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    /// Operations currently running
    pub active: usize,
    /// Completed operations in history
    pub completed: usize,
    /// Failed operations in history
    pub failed: usize,
    /// Cancelled operations in history
    pub cancelled: usize,
}

impl OperationStats {
    /// Settled operations in history
    #[inline]
    #[must_use]
    pub fn settled(&self) -> usize {
        self.completed + self.failed + self.cancelled
    }
}
