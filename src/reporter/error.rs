//! Reporter contract violations

use thiserror::Error;

use crate::models::TestId;

/// Errors raised when the event stream breaks the reporter's preconditions
///
/// Test failures are never reported through this type; they are data carried
/// in [`TestRunInfo`](crate::models::TestRunInfo).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReporterError {
    #[error("{test} is not queued for reporting")]
    TestNotQueued { test: TestId },

    #[error("report queue is empty")]
    EmptyQueue,

    #[error("{actual} completed on every lane before {expected}, which is at the front of the report queue")]
    OutOfOrder { expected: TestId, actual: TestId },

    #[error("task has no lanes; tests scheduled without lanes can never complete")]
    NoLanes,

    #[error("task already started")]
    TaskAlreadyStarted,

    #[error("task event received before task start")]
    TaskNotStarted,

    #[error("task already done")]
    TaskAlreadyDone,
}
