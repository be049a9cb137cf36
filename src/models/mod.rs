//! Data models for lane reporting
//!
//! This module contains the task description and result types shared by the
//! reporter, the lane driver, and the output plugins.

mod task;
mod test_result;

pub use task::{FixtureId, Task, TestId, TestSpec};
pub use test_result::{TaskSummary, TestError, TestRunInfo};
