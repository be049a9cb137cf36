//! Outward reporting interface

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::models::TestRunInfo;

/// Receives the ordered lifecycle calls of a task
///
/// Calls arrive in this order: `report_task_start` once, then for each fixture
/// group a `report_fixture_start` followed by `report_test_done` for each of
/// its tests in schedule order, then `report_task_done` once.
pub trait ReporterPlugin {
    fn report_task_start(
        &mut self,
        start_time: DateTime<Utc>,
        user_agents: &[String],
        test_count: usize,
    );

    fn report_fixture_start(&mut self, name: &str, path: &Path);

    fn report_test_done(&mut self, name: &str, info: &TestRunInfo);

    fn report_task_done(&mut self, end_time: DateTime<Utc>, passed: usize, warnings: &[String]);
}

impl<P: ReporterPlugin + ?Sized> ReporterPlugin for Box<P> {
    fn report_task_start(
        &mut self,
        start_time: DateTime<Utc>,
        user_agents: &[String],
        test_count: usize,
    ) {
        (**self).report_task_start(start_time, user_agents, test_count)
    }

    fn report_fixture_start(&mut self, name: &str, path: &Path) {
        (**self).report_fixture_start(name, path)
    }

    fn report_test_done(&mut self, name: &str, info: &TestRunInfo) {
        (**self).report_test_done(name, info)
    }

    fn report_task_done(&mut self, end_time: DateTime<Utc>, passed: usize, warnings: &[String]) {
        (**self).report_task_done(end_time, passed, warnings)
    }
}
