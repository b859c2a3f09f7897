//! Orchestrator configuration

use faultline_async::{TrackerConfig, DEFAULT_HISTORY_CAPACITY};
use faultline_hub::{HubConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_RECENT_CAPACITY};
use faultline_taxonomy::{PlatformTag, ReportSeverity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Diagnostics configuration
///
/// Consumed once by [`crate::DiagnosticsOrchestrator::new`]; handler list,
/// advice tables and pattern tables are compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Attach detected platform issues to reported errors
    pub enable_platform_detection: bool,
    /// Track wrapped futures and streams
    pub enable_async_tracking: bool,
    /// Initial minimum severity
    pub minimum_severity: ReportSeverity,
    /// Record panics as critical errors while initialized
    pub install_panic_hook: bool,
    /// Register the structured log sink
    pub trace_events: bool,
    /// Settled operations kept
    pub operation_history_capacity: usize,
    /// Buffered events per channel subscriber
    pub channel_capacity: usize,
    /// Manually begun operations older than this are cancelled by the stale
    /// sweep; wrapped futures and streams are exempt. Zero disables the sweep
    pub max_operation_age_secs: u64,
    /// Enhanced reports kept by the enhancer
    pub recent_report_capacity: usize,
    /// Platform the enhancer advises for; the build target when unset
    pub platform: Option<PlatformTag>,
}

impl DiagnosticsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With platform detection on or off
    #[inline]
    #[must_use]
    pub fn with_platform_detection(mut self, enabled: bool) -> Self {
        self.enable_platform_detection = enabled;
        self
    }

    /// With async tracking on or off
    #[inline]
    #[must_use]
    pub fn with_async_tracking(mut self, enabled: bool) -> Self {
        self.enable_async_tracking = enabled;
        self
    }

    /// With minimum severity
    #[inline]
    #[must_use]
    pub fn with_minimum_severity(mut self, severity: ReportSeverity) -> Self {
        self.minimum_severity = severity;
        self
    }

    /// With panic hook installation on or off
    #[inline]
    #[must_use]
    pub fn with_panic_hook(mut self, install: bool) -> Self {
        self.install_panic_hook = install;
        self
    }

    /// With the structured log sink on or off
    #[inline]
    #[must_use]
    pub fn with_trace_events(mut self, enabled: bool) -> Self {
        self.trace_events = enabled;
        self
    }

    /// With operation history capacity
    #[inline]
    #[must_use]
    pub fn with_operation_history_capacity(mut self, capacity: usize) -> Self {
        self.operation_history_capacity = capacity;
        self
    }

    /// With channel capacity
    #[inline]
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// With maximum operation age
    #[inline]
    #[must_use]
    pub fn with_max_operation_age(mut self, age: Duration) -> Self {
        self.max_operation_age_secs = age.as_secs();
        self
    }

    /// With enhanced report capacity
    #[inline]
    #[must_use]
    pub fn with_recent_report_capacity(mut self, capacity: usize) -> Self {
        self.recent_report_capacity = capacity;
        self
    }

    /// With advice platform
    #[inline]
    #[must_use]
    pub fn with_platform(mut self, platform: PlatformTag) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Platform the enhancer advises for
    #[must_use]
    pub fn effective_platform(&self) -> PlatformTag {
        self.platform.unwrap_or_else(PlatformTag::current)
    }

    /// Stale-sweep threshold, if enabled
    #[must_use]
    pub fn max_operation_age(&self) -> Option<Duration> {
        (self.max_operation_age_secs > 0).then(|| Duration::from_secs(self.max_operation_age_secs))
    }

    /// Hub configuration derived from this one
    #[must_use]
    pub fn hub_config(&self) -> HubConfig {
        HubConfig::new()
            .with_minimum_severity(self.minimum_severity)
            .with_channel_capacity(self.channel_capacity)
    }

    /// Tracker configuration derived from this one
    #[must_use]
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig::new()
            .with_enabled(self.enable_async_tracking)
            .with_history_capacity(self.operation_history_capacity)
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enable_platform_detection: true,
            enable_async_tracking: true,
            minimum_severity: ReportSeverity::Debug,
            install_panic_hook: true,
            trace_events: false,
            operation_history_capacity: DEFAULT_HISTORY_CAPACITY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_operation_age_secs: 300,
            recent_report_capacity: DEFAULT_RECENT_CAPACITY,
            platform: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DiagnosticsConfig::default();
        assert!(config.enable_platform_detection);
        assert!(config.enable_async_tracking);
        assert_eq!(config.minimum_severity, ReportSeverity::Debug);
        assert_eq!(config.operation_history_capacity, 100);
        assert_eq!(config.max_operation_age(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn zero_age_disables_sweep() {
        let config = DiagnosticsConfig::new().with_max_operation_age(Duration::ZERO);
        assert_eq!(config.max_operation_age(), None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DiagnosticsConfig =
            serde_json::from_str(r#"{"minimum_severity":"warning","trace_events":true}"#).unwrap();
        assert_eq!(config.minimum_severity, ReportSeverity::Warning);
        assert!(config.trace_events);
        assert!(config.install_panic_hook);
    }

    #[test]
    fn derived_configs() {
        let config = DiagnosticsConfig::new()
            .with_async_tracking(false)
            .with_operation_history_capacity(5)
            .with_minimum_severity(ReportSeverity::Error);
        assert!(!config.tracker_config().enabled);
        assert_eq!(config.tracker_config().history_capacity, 5);
        assert_eq!(config.hub_config().minimum_severity, ReportSeverity::Error);
    }
}
