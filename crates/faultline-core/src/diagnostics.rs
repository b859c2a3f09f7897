//! Read-only diagnostics views

use crate::config::DiagnosticsConfig;
use crate::error::DiagnosticsError;
use chrono::{DateTime, Utc};
use faultline_async::{AsyncOperationContext, OperationStats};
use faultline_hub::EnhancedReport;
use faultline_taxonomy::{DiagnosticEvent, ErrorStatistics, PlatformTag, ReportSeverity};
use serde::Serialize;

/// Number of most recent events included in a snapshot
pub const SNAPSHOT_EVENT_LIMIT: usize = 50;

/// Combined view of hub, tracker and platform state
#[derive(Debug, Clone, Serialize)]
pub struct SystemDiagnostics {
    /// When the view was taken
    pub generated_at: DateTime<Utc>,
    /// Whether `initialize` has run and `dispose` has not
    pub initialized: bool,
    /// Platform advice is given for
    pub platform: PlatformTag,
    /// Hub statistics
    pub statistics: ErrorStatistics,
    /// Running operations, oldest first
    pub active_operations: Vec<AsyncOperationContext>,
    /// Settled operations, oldest first
    pub operation_history: Vec<AsyncOperationContext>,
    /// Operation counters
    pub operation_stats: OperationStats,
    /// Static advice for the platform
    pub recommendations: Vec<String>,
    /// Registered handlers in dispatch order
    pub handlers: Vec<String>,
    /// Current minimum severity
    pub minimum_severity: ReportSeverity,
    /// Configuration in effect
    pub config: DiagnosticsConfig,
}

/// Point-in-time diagnostic bundle
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSnapshot {
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
    /// System view at capture time
    pub diagnostics: SystemDiagnostics,
    /// Most recent events, oldest first
    pub recent_events: Vec<DiagnosticEvent>,
    /// Enhancer's buffered reports, oldest first
    pub enhanced_reports: Vec<EnhancedReport>,
}

impl DiagnosticSnapshot {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DiagnosticsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
