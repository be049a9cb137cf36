//! Result aggregation across lanes
//!
//! Every lane runs the full test list. The reporter folds the per-lane events
//! for each test into one [`ReportItem`] and, once all lanes have reported a
//! test, emits a single `report_test_done` for it. Emission follows schedule
//! order, and a `report_fixture_start` precedes the first test of each
//! fixture group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::queue::{ReportItem, ReportQueue};
use super::{ReporterError, ReporterPlugin, ScreenshotRegistry, ScreenshotSource, TaskEvent};
use crate::models::{FixtureId, Task, TaskSummary, TestError, TestId, TestRunInfo};
use crate::utils::{Clock, SystemClock};

/// How the reporter treats a test that completes before the queue front
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingPolicy {
    /// The completing test must be the queue front; anything else is an error
    #[default]
    Strict,
    /// Finalize immediately, hold the snapshot until the test reaches the front
    Buffered,
}

impl OrderingPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Some(OrderingPolicy::Strict),
            "buffered" => Some(OrderingPolicy::Buffered),
            _ => None,
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingPolicy::Strict => write!(f, "strict"),
            OrderingPolicy::Buffered => write!(f, "buffered"),
        }
    }
}

/// Aggregates lane events for one task and drives a [`ReporterPlugin`]
pub struct Reporter<P> {
    plugin: P,
    task: Arc<Task>,
    ordering: OrderingPolicy,
    screenshots: Box<dyn ScreenshotSource + Send>,
    clock: Arc<dyn Clock>,
    queue: ReportQueue,
    finalized: usize,
    passed: usize,
    unstable: usize,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    warnings: Vec<String>,
    /// First ordering violation; every later event is rejected with it
    aborted: Option<ReporterError>,
}

impl<P: ReporterPlugin> Reporter<P> {
    /// Build the report queue for `task`
    ///
    /// Fails with [`ReporterError::NoLanes`] when the task has no lanes, since
    /// none of its tests could ever complete.
    pub fn new(plugin: P, task: Arc<Task>) -> Result<Self, ReporterError> {
        let lanes = task.lanes().len();
        if lanes == 0 {
            return Err(ReporterError::NoLanes);
        }

        if !task.is_fixture_contiguous() {
            warn!("Tests are not grouped by fixture; fixture starts will repeat");
        }

        let queue = ReportQueue::create(task.tests(), lanes);

        Ok(Self {
            plugin,
            task,
            ordering: OrderingPolicy::default(),
            screenshots: Box::new(ScreenshotRegistry::new()),
            clock: Arc::new(SystemClock),
            queue,
            finalized: 0,
            passed: 0,
            unstable: 0,
            started_at: None,
            completed_at: None,
            warnings: Vec::new(),
            aborted: None,
        })
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_screenshots(mut self, screenshots: impl ScreenshotSource + Send + 'static) -> Self {
        self.screenshots = Box::new(screenshots);
        self
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Apply one event from the task's ordered event stream
    pub fn handle_event(&mut self, event: TaskEvent) -> Result<(), ReporterError> {
        if let Some(err) = &self.aborted {
            return Err(err.clone());
        }

        let result = match event {
            TaskEvent::Start => self.on_task_start(),
            TaskEvent::TestRunStart { test, lane } => self.on_test_run_start(test, lane),
            TaskEvent::TestRunDone {
                test,
                lane,
                errs,
                unstable,
            } => self.on_test_run_done(test, lane, errs, unstable),
            TaskEvent::Done { warnings } => self.on_task_done(warnings),
        };

        // The queue can no longer be drained in order once the front is skipped.
        if let Err(e) = &result {
            if matches!(e, ReporterError::OutOfOrder { .. } | ReporterError::EmptyQueue) {
                self.aborted = Some(e.clone());
            }
        }
        result
    }

    fn on_task_start(&mut self) -> Result<(), ReporterError> {
        if self.completed_at.is_some() {
            return Err(ReporterError::TaskAlreadyDone);
        }
        if self.started_at.is_some() {
            return Err(ReporterError::TaskAlreadyStarted);
        }

        let start_time = self.clock.now();
        self.started_at = Some(start_time);

        let user_agents = self.task.user_agents();
        let test_count = self.task.tests().len();
        info!(
            "Task started: {} tests on {} lanes ({} ordering)",
            test_count,
            user_agents.len(),
            self.ordering
        );

        self.plugin
            .report_task_start(start_time, &user_agents, test_count);

        if let Some(fixture) = self.queue.peek_front().map(|i| i.fixture) {
            self.report_fixture_start(fixture);
        }

        Ok(())
    }

    fn on_test_run_start(&mut self, test: TestId, lane: usize) -> Result<(), ReporterError> {
        self.ensure_running()?;

        let now = self.clock.now();
        self.queue.find_by_test(test)?.record_start(now);
        debug!(%test, lane, "test run started");

        Ok(())
    }

    fn on_test_run_done(
        &mut self,
        test: TestId,
        lane: usize,
        errs: Vec<TestError>,
        unstable: bool,
    ) -> Result<(), ReporterError> {
        self.ensure_running()?;

        // Check before folding the report in, so a rejected report changes nothing.
        if self.ordering == OrderingPolicy::Strict
            && self.queue.find_by_test(test)?.pending_runs <= 1
        {
            self.check_front(test)?;
        }

        let error_count = errs.len();
        let item = self.queue.find_by_test(test)?;
        let complete = item.record_done(errs, unstable);
        debug!(
            %test,
            lane,
            errors = error_count,
            unstable,
            pending = item.pending_runs,
            "test run done"
        );

        if complete {
            self.finalize(test)?;
        }

        Ok(())
    }

    fn on_task_done(&mut self, warnings: Vec<String>) -> Result<(), ReporterError> {
        self.ensure_running()?;

        if !self.queue.is_empty() {
            warn!(
                "Task done with {} tests still waiting for lanes",
                self.queue.len()
            );
        }

        let end_time = self.clock.now();
        self.completed_at = Some(end_time);
        info!(
            "Task done: {}/{} passed",
            self.passed,
            self.task.tests().len()
        );

        self.plugin.report_task_done(end_time, self.passed, &warnings);
        self.warnings = warnings;

        Ok(())
    }

    /// Every lane has reported `test`
    fn finalize(&mut self, test: TestId) -> Result<(), ReporterError> {
        let now = self.clock.now();
        let item = self.queue.find_by_test(test)?;

        if self.screenshots.has_captured_for(test) {
            item.screenshot_path = self.screenshots.path_for(test);
        }
        if item.start_time.is_none() {
            warn!(%test, "Test finished without a recorded start; reporting zero duration");
        }

        let info = item.snapshot(now);
        self.finalized += 1;
        if info.passed() {
            self.passed += 1;
        }
        if info.unstable {
            self.unstable += 1;
        }

        match self.ordering {
            OrderingPolicy::Strict => {
                let item = self.queue.remove_front()?;
                self.emit_test_done(&item, &info);
            }
            OrderingPolicy::Buffered => {
                item.finalized = Some(info);
                while let Some((item, info)) = self.queue.pop_finalized_front() {
                    self.emit_test_done(&item, &info);
                }
            }
        }

        Ok(())
    }

    fn emit_test_done(&mut self, item: &ReportItem, info: &TestRunInfo) {
        let name = self
            .task
            .test(item.test)
            .map(|t| t.name.as_str())
            .unwrap_or_default();
        debug!("reporting {name}: {info}");
        self.plugin.report_test_done(name, info);

        // Tests are grouped by fixture, so a change at the front opens a new group.
        if let Some(next) = self.queue.peek_front().map(|i| i.fixture) {
            if next != item.fixture {
                self.report_fixture_start(next);
            }
        }
    }

    fn check_front(&self, test: TestId) -> Result<(), ReporterError> {
        let front = self
            .queue
            .peek_front()
            .map(|i| i.test)
            .ok_or(ReporterError::EmptyQueue)?;
        if front != test {
            return Err(ReporterError::OutOfOrder {
                expected: front,
                actual: test,
            });
        }
        Ok(())
    }

    fn report_fixture_start(&mut self, id: FixtureId) {
        if let Some(fixture) = self.task.fixture(id) {
            self.plugin.report_fixture_start(&fixture.name, &fixture.path);
        }
    }

    fn ensure_running(&self) -> Result<(), ReporterError> {
        if self.completed_at.is_some() {
            return Err(ReporterError::TaskAlreadyDone);
        }
        if self.started_at.is_none() {
            return Err(ReporterError::TaskNotStarted);
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Tests not yet reported
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Run summary, once the task is done
    pub fn summary(&self) -> Option<TaskSummary> {
        let started_at = self.started_at?;
        let completed_at = self.completed_at?;
        Some(TaskSummary {
            total: self.task.tests().len(),
            passed: self.passed,
            failed: self.finalized - self.passed,
            unstable: self.unstable,
            started_at,
            completed_at,
            warnings: self.warnings.clone(),
        })
    }

    #[cfg(test)]
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn into_plugin(self) -> P {
        self.plugin
    }
}
