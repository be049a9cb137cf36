//! Task lifecycle events consumed by the reporter

use serde::{Deserialize, Serialize};

use crate::models::{TestError, TestId};

/// An event from the task's single ordered event source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TaskEvent {
    /// The task started; fires once before any test event
    Start,

    /// A lane began running a test
    TestRunStart { test: TestId, lane: usize },

    /// A lane finished running a test
    TestRunDone {
        test: TestId,
        lane: usize,
        errs: Vec<TestError>,
        unstable: bool,
    },

    /// The task finished; fires once after every test is done
    Done { warnings: Vec<String> },
}

impl TaskEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TaskEvent::Start => "start",
            TaskEvent::TestRunStart { .. } => "test-run-start",
            TaskEvent::TestRunDone { .. } => "test-run-done",
            TaskEvent::Done { .. } => "done",
        }
    }
}
