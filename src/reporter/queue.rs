//! Report queue
//!
//! One [`ReportItem`] per scheduled test, in schedule order, consumed strictly
//! from the front.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::path::PathBuf;

use super::ReporterError;
use crate::models::{FixtureId, TestError, TestId, TestRunInfo, TestSpec};
use crate::utils::elapsed_ms;

/// Per-test aggregation record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportItem {
    pub fixture: FixtureId,
    pub test: TestId,

    /// Lanes that have not yet reported this test
    pub pending_runs: usize,

    pub errs: Vec<TestError>,
    pub unstable: bool,
    pub screenshot_path: Option<PathBuf>,

    /// Set by the first lane to start the test
    pub start_time: Option<DateTime<Utc>>,

    /// Snapshot held until the item reaches the front of the queue
    pub(crate) finalized: Option<TestRunInfo>,
}

impl ReportItem {
    pub fn new(test: &TestSpec, lanes_per_test: usize) -> Self {
        Self {
            fixture: test.fixture,
            test: test.id,
            pending_runs: lanes_per_test,
            errs: Vec::new(),
            unstable: false,
            screenshot_path: None,
            start_time: None,
            finalized: None,
        }
    }

    /// Start the timer unless an earlier lane already did
    pub fn record_start(&mut self, now: DateTime<Utc>) {
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
    }

    /// Fold one lane's completion in; returns true once every lane reported
    pub fn record_done(&mut self, errs: Vec<TestError>, unstable: bool) -> bool {
        self.pending_runs = self.pending_runs.saturating_sub(1);
        self.errs.extend(errs);
        self.unstable |= unstable;
        self.pending_runs == 0
    }

    /// Build the immutable snapshot; errors sorted by lane label then category
    pub fn snapshot(&self, now: DateTime<Utc>) -> TestRunInfo {
        let mut errs = self.errs.clone();
        errs.sort_by(TestError::report_order);

        TestRunInfo {
            errs,
            duration_ms: self.start_time.map(|s| elapsed_ms(s, now)).unwrap_or(0),
            unstable: self.unstable,
            screenshot_path: self.screenshot_path.clone(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }
}

/// Ordered queue of report items
#[derive(Clone, Debug, Default)]
pub struct ReportQueue {
    items: VecDeque<ReportItem>,
}

impl ReportQueue {
    /// One item per test, in the given order
    pub fn create<'a>(tests: impl IntoIterator<Item = &'a TestSpec>, lanes_per_test: usize) -> Self {
        Self {
            items: tests
                .into_iter()
                .map(|t| ReportItem::new(t, lanes_per_test))
                .collect(),
        }
    }

    /// The queued, not yet finalized item tracking `test`
    pub fn find_by_test(&mut self, test: TestId) -> Result<&mut ReportItem, ReporterError> {
        self.items
            .iter_mut()
            .find(|i| i.test == test && !i.is_finalized())
            .ok_or(ReporterError::TestNotQueued { test })
    }

    pub fn remove_front(&mut self) -> Result<ReportItem, ReporterError> {
        self.items.pop_front().ok_or(ReporterError::EmptyQueue)
    }

    /// Pop the front item together with its snapshot if it is finalized
    pub fn pop_finalized_front(&mut self) -> Option<(ReportItem, TestRunInfo)> {
        if !self.items.front().is_some_and(ReportItem::is_finalized) {
            return None;
        }
        let mut item = self.items.pop_front()?;
        let info = item.finalized.take()?;
        Some((item, info))
    }

    pub fn peek_front(&self) -> Option<&ReportItem> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
