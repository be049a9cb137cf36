//! Task scripts
//!
//! A task script lists the lanes, the fixtures with their tests, and what each
//! lane reports for each test. The lane driver replays it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::is_yaml_file;
use crate::models::{Task, TestError, TestId};

/// Task script file structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskScript {
    /// One lane per user agent, in this order
    pub user_agents: Vec<String>,

    #[serde(default)]
    pub fixtures: Vec<FixtureScript>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixtureScript {
    pub name: String,

    /// Defaults to the fixture name
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub tests: Vec<TestScript>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestScript {
    pub name: String,

    /// Outcome per user agent; a lane without an entry passes cleanly
    #[serde(default)]
    pub outcomes: BTreeMap<String, LaneOutcome>,
}

/// What one lane reports for one test
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneOutcome {
    #[serde(default)]
    pub errors: Vec<ErrorScript>,

    #[serde(default)]
    pub unstable: bool,

    /// Screenshot captured by this lane before it reports
    #[serde(default)]
    pub screenshot: Option<PathBuf>,

    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorScript {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Outcomes keyed by test and lane index
pub type Outcomes = HashMap<(TestId, usize), LaneOutcome>;

/// A script resolved into a task plus the outcomes to replay
#[derive(Debug)]
pub struct TaskPlan {
    pub task: Task,
    pub outcomes: Outcomes,
    pub warnings: Vec<String>,
}

impl TaskScript {
    /// Load a task script from a YAML or JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task file: {}", path.display()))?;

        let script: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML task: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON task: {}", path.display()))?
        };

        Ok(script)
    }

    /// Reject scripts that cannot be replayed
    pub fn validate(&self) -> Result<()> {
        if self.user_agents.is_empty() {
            anyhow::bail!("Task has no user agents; at least one lane is required");
        }

        let mut seen = HashSet::new();
        for ua in &self.user_agents {
            if !seen.insert(ua.as_str()) {
                anyhow::bail!("Duplicate user agent '{ua}'");
            }
        }

        let mut seen = HashSet::new();
        for fixture in &self.fixtures {
            if !seen.insert(fixture.name.as_str()) {
                anyhow::bail!(
                    "Duplicate fixture '{}'; tests of a fixture must be listed together",
                    fixture.name
                );
            }
        }

        Ok(())
    }

    /// Non-fatal problems, reported with the task results
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for fixture in &self.fixtures {
            if fixture.tests.is_empty() {
                warnings.push(format!("Fixture '{}' has no tests", fixture.name));
            }
            for test in &fixture.tests {
                for ua in test.outcomes.keys() {
                    if !self.user_agents.contains(ua) {
                        warnings.push(format!(
                            "Test '{}' in fixture '{}' has an outcome for unknown user agent '{}'",
                            test.name, fixture.name, ua
                        ));
                    }
                }
            }
        }

        warnings
    }

    pub fn test_count(&self) -> usize {
        self.fixtures.iter().map(|f| f.tests.len()).sum()
    }

    /// Validate and resolve into a [`TaskPlan`]
    pub fn plan(&self) -> Result<TaskPlan> {
        self.validate()?;

        let mut builder = Task::builder();
        for ua in &self.user_agents {
            builder.add_lane(ua.as_str());
        }

        let mut outcomes = Outcomes::new();
        for fixture in &self.fixtures {
            let path = fixture
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(&fixture.name));
            let fixture_id = builder.add_fixture(fixture.name.as_str(), path);

            for test in &fixture.tests {
                let test_id = builder.add_test(fixture_id, test.name.as_str());
                for (lane, ua) in self.user_agents.iter().enumerate() {
                    if let Some(outcome) = test.outcomes.get(ua) {
                        outcomes.insert((test_id, lane), outcome.clone());
                    }
                }
            }
        }

        Ok(TaskPlan {
            task: builder.build(),
            outcomes,
            warnings: self.warnings(),
        })
    }

    /// Small script used by `init`
    pub fn example() -> Self {
        let outcome = LaneOutcome {
            errors: vec![ErrorScript {
                kind: "assertion".to_string(),
                message: "expected 'Welcome' to equal 'Hello'".to_string(),
            }],
            screenshot: Some(PathBuf::from("screenshots/greeting-firefox.png")),
            duration_ms: 120,
            ..LaneOutcome::default()
        };

        Self {
            user_agents: vec!["Chrome 120".to_string(), "Firefox 121".to_string()],
            fixtures: vec![
                FixtureScript {
                    name: "Login".to_string(),
                    path: Some(PathBuf::from("tests/login.js")),
                    tests: vec![
                        TestScript {
                            name: "accepts valid credentials".to_string(),
                            outcomes: BTreeMap::new(),
                        },
                        TestScript {
                            name: "shows greeting".to_string(),
                            outcomes: BTreeMap::from([("Firefox 121".to_string(), outcome)]),
                        },
                    ],
                },
                FixtureScript {
                    name: "Search".to_string(),
                    path: Some(PathBuf::from("tests/search.js")),
                    tests: vec![TestScript {
                        name: "finds results".to_string(),
                        outcomes: BTreeMap::from([(
                            "Chrome 120".to_string(),
                            LaneOutcome {
                                unstable: true,
                                duration_ms: 80,
                                ..LaneOutcome::default()
                            },
                        )]),
                    }],
                },
            ],
        }
    }

    /// Save the script to a YAML or JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize task")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize task")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write task file: {}", path.display()))?;
        Ok(())
    }
}

impl LaneOutcome {
    /// Errors as reported by the lane labelled `user_agent`
    pub fn errors_for(&self, user_agent: &str) -> Vec<TestError> {
        self.errors
            .iter()
            .map(|e| TestError::new(user_agent, e.kind.as_str(), e.message.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCRIPT: &str = r#"
user_agents: [Chrome, Firefox]
fixtures:
  - name: Auth
    path: tests/auth.js
    tests:
      - name: logs in
      - name: logs out
        outcomes:
          Firefox:
            unstable: true
            errors:
              - type: assertion
                message: still logged in
  - name: Search
    tests:
      - name: finds
        outcomes:
          Safari: {}
"#;

    #[test]
    fn test_plan_from_yaml() {
        let script: TaskScript = serde_yaml::from_str(SCRIPT).unwrap();
        let plan = script.plan().unwrap();

        assert_eq!(plan.task.tests().len(), 3);
        assert_eq!(plan.task.lanes().len(), 2);
        assert_eq!(plan.task.fixtures()[1].path, PathBuf::from("Search"));

        let outcome = &plan.outcomes[&(TestId(1), 1)];
        assert!(outcome.unstable);
        assert_eq!(
            outcome.errors_for("Firefox"),
            vec![TestError::new("Firefox", "assertion", "still logged in")]
        );
        assert!(!plan.outcomes.contains_key(&(TestId(1), 0)));

        assert_eq!(plan.warnings.len(), 1);
        assert!(plan.warnings[0].contains("unknown user agent 'Safari'"));
    }

    #[test]
    fn test_validate_rejects_no_lanes() {
        let script = TaskScript::default();
        assert!(script.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut script = TaskScript::example();
        script.user_agents.push("Chrome 120".to_string());
        assert!(script.validate().is_err());

        let mut script = TaskScript::example();
        let dup = script.fixtures[0].clone();
        script.fixtures.push(dup);
        assert!(script.validate().is_err());
    }

    #[test]
    fn test_example_save_load() {
        let dir = tempdir().unwrap();
        for file in ["task.yaml", "task.json"] {
            let path = dir.path().join(file);
            TaskScript::example().save(&path).unwrap();

            let loaded = TaskScript::load(&path).unwrap();
            assert_eq!(loaded.test_count(), 3);
            assert!(loaded.warnings().is_empty());
        }
    }
}
