//! Task execution runner
//!
//! Wires a task script, the scripted lanes, and a reporter together.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use super::event_loop;
use super::lanes::LaneDriver;
use super::script::TaskScript;
use crate::models::TaskSummary;
use crate::reporter::{OrderingPolicy, Reporter, ReporterPlugin, ScreenshotRegistry};

/// Runs a scripted task through the reporter
pub struct TaskRunner {
    ordering: OrderingPolicy,
    realtime: bool,
    channel_capacity: usize,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self {
            ordering: OrderingPolicy::default(),
            realtime: false,
            channel_capacity: 64,
        }
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    #[cfg(test)]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Replay `script`, reporting through `plugin`
    ///
    /// Returns the task summary and the plugin once task done was reported.
    pub async fn run<P: ReporterPlugin>(
        &self,
        script: &TaskScript,
        plugin: P,
    ) -> Result<(TaskSummary, P)> {
        let plan = script.plan()?;
        let task = Arc::new(plan.task);
        let screenshots = ScreenshotRegistry::new();

        let reporter = Reporter::new(plugin, task.clone())
            .context("Failed to set up reporter")?
            .with_ordering(self.ordering)
            .with_screenshots(screenshots.clone());

        info!(
            "Replaying {} tests across {} lanes",
            task.tests().len(),
            task.lanes().len()
        );

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let driver =
            LaneDriver::new(task, plan.outcomes, screenshots).with_realtime(self.realtime);
        let lanes = tokio::spawn(driver.run(tx, plan.warnings));

        let reporter = event_loop::drive(reporter, rx)
            .await
            .context("Reporter aborted the run")?;

        lanes.await.context("Lane driver panicked")??;

        let summary = reporter
            .summary()
            .context("Event stream ended before task done")?;

        info!(
            "Task completed in {}ms - Pass: {}/{} ({:.1}%)",
            summary.duration_ms(),
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        Ok((summary, reporter.into_plugin()))
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::test_helpers::RecordingPlugin;
    use std::path::PathBuf;

    #[test]
    fn test_runner_creation() {
        let runner = TaskRunner::new()
            .with_ordering(OrderingPolicy::Buffered)
            .with_channel_capacity(0);
        assert_eq!(runner.ordering, OrderingPolicy::Buffered);
        assert_eq!(runner.channel_capacity, 1);
    }

    #[tokio::test]
    async fn test_run_example_script() {
        let (summary, plugin) = TaskRunner::new()
            .run(&TaskScript::example(), RecordingPlugin::new())
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.unstable, 1);

        assert_eq!(
            plugin.trace(),
            vec![
                "task",
                "fixture:Login",
                "test:accepts valid credentials",
                "test:shows greeting",
                "fixture:Search",
                "test:finds results",
                "done:2"
            ]
        );

        let greeting = plugin.test_info("shows greeting").unwrap();
        assert_eq!(
            greeting.screenshot_path,
            Some(PathBuf::from("screenshots/greeting-firefox.png"))
        );
        assert_eq!(greeting.errs[0].user_agent, "Firefox 121");
    }

    #[tokio::test]
    async fn test_run_with_tiny_channel_and_buffered_ordering() {
        let (summary, plugin) = TaskRunner::new()
            .with_ordering(OrderingPolicy::Buffered)
            .with_channel_capacity(1)
            .run(&TaskScript::example(), RecordingPlugin::new())
            .await
            .unwrap();

        assert_eq!(summary.passed, 2);
        assert_eq!(plugin.test_names().len(), 3);
    }

    #[tokio::test]
    async fn test_run_rejects_script_without_lanes() {
        let script = TaskScript::default();
        assert!(TaskRunner::new()
            .run(&script, RecordingPlugin::new())
            .await
            .is_err());
    }
}
