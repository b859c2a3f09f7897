//! Aggregate statistics over reported events

use crate::category::ErrorCategory;
use crate::event::DiagnosticEvent;
use crate::severity::ReportSeverity;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts derived from a hub's history
///
/// `by_category` keeps first-seen order, which is also the tie-break for
/// [`ErrorStatistics::most_common_category`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorStatistics {
    /// All events counted
    pub total_reports: usize,
    /// Error events
    pub total_errors: usize,
    /// Warning events
    pub total_warnings: usize,
    /// Info events
    pub total_infos: usize,
    /// Error events per category, first-seen order
    pub by_category: IndexMap<ErrorCategory, usize>,
    /// Events per effective severity
    pub by_severity: BTreeMap<ReportSeverity, usize>,
    /// Timestamp of the latest error event
    pub last_error_at: Option<DateTime<Utc>>,
    /// Category with the highest error count
    pub most_common_category: Option<ErrorCategory>,
}

impl ErrorStatistics {
    /// Empty statistics
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute from a sequence of events
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a DiagnosticEvent>) -> Self {
        let mut stats = Self::new();
        for event in events {
            stats.record(event);
        }
        stats
    }

    /// Fold one more event into the counts
    pub fn record(&mut self, event: &DiagnosticEvent) {
        self.total_reports += 1;
        *self.by_severity.entry(event.severity()).or_insert(0) += 1;

        match event {
            DiagnosticEvent::Error(error) => {
                self.total_errors += 1;
                *self.by_category.entry(error.category).or_insert(0) += 1;
                self.last_error_at = Some(
                    self.last_error_at
                        .map_or(error.timestamp, |prev| prev.max(error.timestamp)),
                );
                self.most_common_category = self.compute_most_common();
            }
            DiagnosticEvent::Warning(_) => self.total_warnings += 1,
            DiagnosticEvent::Info(_) => self.total_infos += 1,
        }
    }

    /// Whether nothing has been counted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_reports == 0
    }

    /// Error count for one category
    #[must_use]
    pub fn category_count(&self, category: ErrorCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    /// Event count for one severity
    #[must_use]
    pub fn severity_count(&self, severity: ReportSeverity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    fn compute_most_common(&self) -> Option<ErrorCategory> {
        let mut best: Option<(ErrorCategory, usize)> = None;
        for (category, count) in &self.by_category {
            match best {
                Some((_, top)) if *count <= top => {}
                _ => best = Some((*category, *count)),
            }
        }
        best.map(|(category, _)| category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ErrorEvent, InfoEvent, WarningEvent};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn error(category: ErrorCategory) -> DiagnosticEvent {
        ErrorEvent::new("e", category).into()
    }

    #[test]
    fn empty_statistics_have_no_most_common() {
        let stats = ErrorStatistics::new();
        assert!(stats.is_empty());
        assert_eq!(stats.most_common_category, None);
        assert_eq!(stats.last_error_at, None);
    }

    #[test]
    fn most_common_tie_goes_to_first_seen() {
        let events = vec![
            error(ErrorCategory::Network),
            error(ErrorCategory::Validation),
            error(ErrorCategory::Validation),
            error(ErrorCategory::Network),
        ];
        let stats = ErrorStatistics::from_events(&events);
        assert_eq!(stats.most_common_category, Some(ErrorCategory::Network));

        let mut more = events;
        more.push(error(ErrorCategory::Validation));
        let stats = ErrorStatistics::from_events(&more);
        assert_eq!(stats.most_common_category, Some(ErrorCategory::Validation));
    }

    #[test]
    fn counts_by_kind_and_severity() {
        let events: Vec<DiagnosticEvent> = vec![
            error(ErrorCategory::Network),
            ErrorEvent::new("fatal", ErrorCategory::Unknown).critical().into(),
            WarningEvent::new("w").into(),
            InfoEvent::new("i").into(),
        ];
        let stats = ErrorStatistics::from_events(&events);
        assert_eq!(stats.total_reports, 4);
        assert_eq!(stats.total_errors, 2);
        assert_eq!(stats.total_warnings, 1);
        assert_eq!(stats.total_infos, 1);
        assert_eq!(stats.severity_count(ReportSeverity::Critical), 1);
        assert_eq!(stats.severity_count(ReportSeverity::Error), 1);
        assert_eq!(stats.category_count(ErrorCategory::Network), 1);
        assert!(stats.last_error_at.is_some());
    }

    fn arb_event() -> impl Strategy<Value = DiagnosticEvent> {
        prop_oneof![
            (0..ErrorCategory::ALL.len()).prop_map(|i| error(ErrorCategory::ALL[i])),
            Just(DiagnosticEvent::from(WarningEvent::new("w"))),
            Just(DiagnosticEvent::from(InfoEvent::new("i"))),
        ]
    }

    proptest! {
        #[test]
        fn totals_are_consistent(events in proptest::collection::vec(arb_event(), 0..64)) {
            let stats = ErrorStatistics::from_events(&events);
            prop_assert_eq!(stats.total_reports, events.len());
            prop_assert_eq!(
                stats.total_reports,
                stats.total_errors + stats.total_warnings + stats.total_infos
            );
            prop_assert_eq!(stats.by_category.values().sum::<usize>(), stats.total_errors);
            prop_assert_eq!(stats.by_severity.values().sum::<usize>(), stats.total_reports);
        }
    }
}
