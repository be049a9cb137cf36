//! Scripted lanes
//!
//! Runs one task per lane. Every lane walks the full test list in schedule
//! order and sends its events into a shared channel, which serializes them
//! into the single stream the reporter consumes.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::script::Outcomes;
use crate::models::Task;
use crate::reporter::{ScreenshotRegistry, TaskEvent};
use crate::utils::Timer;

/// Replays scripted outcomes across concurrent lanes
pub struct LaneDriver {
    task: Arc<Task>,
    outcomes: Arc<Outcomes>,
    screenshots: ScreenshotRegistry,
    realtime: bool,
}

impl LaneDriver {
    pub fn new(task: Arc<Task>, outcomes: Outcomes, screenshots: ScreenshotRegistry) -> Self {
        Self {
            task,
            outcomes: Arc::new(outcomes),
            screenshots,
            realtime: false,
        }
    }

    /// Sleep for each scripted test duration instead of reporting at once
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Send the whole task's events, start to done
    ///
    /// Fails if the receiving side hangs up, which happens when the reporter
    /// rejects an event.
    pub async fn run(self, tx: mpsc::Sender<TaskEvent>, warnings: Vec<String>) -> Result<()> {
        let timer = Timer::start("lanes");

        tx.send(TaskEvent::Start)
            .await
            .context("Reporter stopped before task start")?;

        info!(
            "Running {} tests on {} lanes",
            self.task.tests().len(),
            self.task.lanes().len()
        );

        let mut handles = Vec::new();

        for (lane, _) in self.task.lanes().iter().enumerate() {
            let task = self.task.clone();
            let outcomes = self.outcomes.clone();
            let screenshots = self.screenshots.clone();
            let tx = tx.clone();
            let realtime = self.realtime;

            let handle = tokio::spawn(async move {
                run_lane(lane, &task, &outcomes, &screenshots, &tx, realtime).await
            });

            handles.push(handle);
        }

        for result in join_all(handles).await {
            result.context("Lane task panicked")??;
        }

        tx.send(TaskEvent::Done { warnings })
            .await
            .context("Reporter stopped before task done")?;

        timer.stop();
        Ok(())
    }
}

async fn run_lane(
    lane: usize,
    task: &Task,
    outcomes: &Outcomes,
    screenshots: &ScreenshotRegistry,
    tx: &mpsc::Sender<TaskEvent>,
    realtime: bool,
) -> Result<()> {
    let user_agent = &task.lanes()[lane].user_agent;

    for test in task.tests() {
        debug!("{} running '{}'", user_agent, test.name);
        tx.send(TaskEvent::TestRunStart {
            test: test.id,
            lane,
        })
        .await
        .context("Reporter stopped")?;

        let outcome = outcomes.get(&(test.id, lane)).cloned().unwrap_or_default();

        if realtime && outcome.duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(outcome.duration_ms)).await;
        }

        if let Some(path) = &outcome.screenshot {
            screenshots.register(test.id, path.clone());
        }

        tx.send(TaskEvent::TestRunDone {
            test: test.id,
            lane,
            errs: outcome.errors_for(user_agent),
            unstable: outcome.unstable,
        })
        .await
        .context("Reporter stopped")?;
    }

    Ok(())
}
