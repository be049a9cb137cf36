//! Test result models
//!
//! Defines lane error records, the finalized per-test snapshot, and the
//! run-wide summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use crate::utils::elapsed_ms;

/// An error reported by one lane for one test
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestError {
    /// Label of the lane that produced the error
    pub user_agent: String,

    /// Error category
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,
}

impl TestError {
    pub fn new(
        user_agent: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Ordering used for finalized error lists: lane label, then category
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.user_agent
            .cmp(&other.user_agent)
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.user_agent, self.kind, self.message)
    }
}

/// Immutable snapshot of a finalized test
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunInfo {
    /// Errors from every lane, sorted by [`TestError::report_order`]
    pub errs: Vec<TestError>,
    pub duration_ms: u64,
    pub unstable: bool,
    pub screenshot_path: Option<PathBuf>,
}

impl TestRunInfo {
    pub fn passed(&self) -> bool {
        self.errs.is_empty()
    }

    pub fn symbol(&self) -> &'static str {
        if self.passed() {
            "✓"
        } else {
            "✗"
        }
    }
}

impl fmt::Display for TestRunInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}ms]", self.symbol(), self.duration_ms)?;
        if self.unstable {
            write!(f, " (unstable)")?;
        }
        if !self.errs.is_empty() {
            write!(f, " - {} error(s)", self.errs.len())?;
        }
        Ok(())
    }
}

/// Summary of a whole task, available once it is done
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub unstable: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub warnings: Vec<String>,
}

impl TaskSummary {
    pub fn duration_ms(&self) -> u64 {
        elapsed_ms(self.started_at, self.completed_at)
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for TaskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Unstable: {}",
            self.total, self.passed, self.failed, self.unstable
        )?;
        write!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.duration_ms()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_error_report_order() {
        let mut errs = vec![
            TestError::new("Firefox", "assertion", "b"),
            TestError::new("Chrome", "uncaught", "c"),
            TestError::new("Chrome", "assertion", "a"),
        ];
        errs.sort_by(TestError::report_order);

        let keys: Vec<_> = errs
            .iter()
            .map(|e| (e.user_agent.as_str(), e.kind.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Chrome", "assertion"),
                ("Chrome", "uncaught"),
                ("Firefox", "assertion")
            ]
        );
    }

    #[test]
    fn test_run_info_display() {
        let info = TestRunInfo {
            errs: vec![TestError::new("Chrome", "assertion", "boom")],
            duration_ms: 42,
            unstable: true,
            screenshot_path: None,
        };
        assert!(!info.passed());
        assert_eq!(info.to_string(), "✗ [42ms] (unstable) - 1 error(s)");
    }

    #[test]
    fn test_summary_rates() {
        let started_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summary = TaskSummary {
            total: 4,
            passed: 3,
            failed: 1,
            unstable: 0,
            started_at,
            completed_at: started_at + chrono::Duration::milliseconds(1500),
            warnings: Vec::new(),
        };
        assert_eq!(summary.pass_rate(), 75.0);
        assert_eq!(summary.duration_ms(), 1500);
        assert!(!summary.is_all_passed());
    }

    #[test]
    fn test_error_serializes_kind_as_type() {
        let json = serde_json::to_value(TestError::new("Chrome", "assertion", "x")).unwrap();
        assert_eq!(json["type"], "assertion");
    }
}
