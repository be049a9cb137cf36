//! Plugin that records every call for assertions

use chrono::{DateTime, Utc};
use std::path::Path;

use super::ReporterPlugin;
use crate::models::TestRunInfo;

#[derive(Clone, Debug, PartialEq)]
pub enum PluginCall {
    TaskStart {
        start_time: DateTime<Utc>,
        user_agents: Vec<String>,
        test_count: usize,
    },
    FixtureStart {
        name: String,
        path: String,
    },
    TestDone {
        name: String,
        info: TestRunInfo,
    },
    TaskDone {
        end_time: DateTime<Utc>,
        passed: usize,
        warnings: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct RecordingPlugin {
    pub calls: Vec<PluginCall>,
}

impl RecordingPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixture_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PluginCall::FixtureStart { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn test_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PluginCall::TestDone { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn test_info(&self, test_name: &str) -> Option<&TestRunInfo> {
        self.calls.iter().find_map(|c| match c {
            PluginCall::TestDone { name, info } if name == test_name => Some(info),
            _ => None,
        })
    }

    /// Compact trace of the call sequence, e.g. `["task", "fixture:A", "test:a1"]`
    pub fn trace(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|c| match c {
                PluginCall::TaskStart { .. } => "task".to_string(),
                PluginCall::FixtureStart { name, .. } => format!("fixture:{name}"),
                PluginCall::TestDone { name, .. } => format!("test:{name}"),
                PluginCall::TaskDone { passed, .. } => format!("done:{passed}"),
            })
            .collect()
    }
}

impl ReporterPlugin for RecordingPlugin {
    fn report_task_start(
        &mut self,
        start_time: DateTime<Utc>,
        user_agents: &[String],
        test_count: usize,
    ) {
        self.calls.push(PluginCall::TaskStart {
            start_time,
            user_agents: user_agents.to_vec(),
            test_count,
        });
    }

    fn report_fixture_start(&mut self, name: &str, path: &Path) {
        self.calls.push(PluginCall::FixtureStart {
            name: name.to_string(),
            path: path.display().to_string(),
        });
    }

    fn report_test_done(&mut self, name: &str, info: &TestRunInfo) {
        self.calls.push(PluginCall::TestDone {
            name: name.to_string(),
            info: info.clone(),
        });
    }

    fn report_task_done(&mut self, end_time: DateTime<Utc>, passed: usize, warnings: &[String]) {
        self.calls.push(PluginCall::TaskDone {
            end_time,
            passed,
            warnings: warnings.to_vec(),
        });
    }
}
