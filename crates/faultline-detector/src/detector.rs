//! Platform issue detector
//!
//! Pure classification of diagnostic text into [`PlatformIssue`] records.
//! Every platform table is evaluated regardless of the platform the process
//! runs on, so one event can surface advice for several targets.

use crate::rules::{recommendations, CATEGORY_RULES, PLATFORM_RULES};
use faultline_taxonomy::{ErrorCategory, PlatformIssue, PlatformTag};

/// Stateless matcher over the compiled-in pattern tables
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformIssueDetector;

impl PlatformIssueDetector {
    /// Create detector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Match `message` and `stack` against every platform table
    ///
    /// Generic rules run first in table order. Category rules for `category`
    /// run afterwards and are skipped when an issue of the same platform and
    /// type has already matched.
    #[must_use]
    pub fn analyze(
        &self,
        message: &str,
        stack: Option<&str>,
        category: Option<ErrorCategory>,
    ) -> Vec<PlatformIssue> {
        let haystack = haystack(message, stack);

        let mut issues: Vec<PlatformIssue> = PLATFORM_RULES
            .iter()
            .filter(|rule| rule.predicate.matches(&haystack))
            .map(|rule| rule.template.instantiate(rule.platform))
            .collect();

        if let Some(category) = category {
            for rule in CATEGORY_RULES.iter().filter(|r| r.category == category) {
                let duplicate = issues.iter().any(|i| {
                    i.platform == rule.platform && i.issue_type == rule.template.issue_type
                });
                if !duplicate && rule.predicate.matches(&haystack) {
                    issues.push(rule.template.instantiate(rule.platform));
                }
            }
        }

        issues
    }

    /// [`analyze`](Self::analyze) restricted to one platform
    #[must_use]
    pub fn analyze_for(
        &self,
        platform: PlatformTag,
        message: &str,
        stack: Option<&str>,
        category: Option<ErrorCategory>,
    ) -> Vec<PlatformIssue> {
        self.analyze(message, stack, category)
            .into_iter()
            .filter(|issue| issue.platform == platform)
            .collect()
    }

    /// General advice for a platform
    #[must_use]
    pub fn recommendations(&self, platform: PlatformTag) -> Vec<String> {
        recommendations(platform)
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    /// Number of rules (generic + category)
    #[inline]
    #[must_use]
    pub fn rule_count(&self) -> usize {
        PLATFORM_RULES.len() + CATEGORY_RULES.len()
    }
}

fn haystack(message: &str, stack: Option<&str>) -> String {
    match stack {
        Some(stack) => format!("{message}\n{stack}").to_lowercase(),
        None => message.to_lowercase(),
    }
}
