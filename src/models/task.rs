//! Task models
//!
//! A task is the ordered list of scheduled tests, grouped by fixture, plus the
//! lanes that each run the full list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Index of a fixture within its task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId(pub usize);

/// Index of a test within its task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestId(pub usize);

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixture #{}", self.0)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test #{}", self.0)
    }
}

/// A named group of tests sharing setup context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub path: PathBuf,
}

/// A scheduled test
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    pub id: TestId,
    pub name: String,
    pub fixture: FixtureId,
}

/// One concurrent execution context (e.g. a browser connection)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub user_agent: String,
}

impl Lane {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

/// Immutable description of a run: fixtures, tests in schedule order, lanes
#[derive(Clone, Debug, Default)]
pub struct Task {
    fixtures: Vec<Fixture>,
    tests: Vec<TestSpec>,
    lanes: Vec<Lane>,
}

impl Task {
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }

    #[cfg(test)]
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn tests(&self) -> &[TestSpec] {
        &self.tests
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id.0)
    }

    pub fn test(&self, id: TestId) -> Option<&TestSpec> {
        self.tests.get(id.0)
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.lanes.iter().map(|l| l.user_agent.clone()).collect()
    }

    /// True when every fixture's tests form one contiguous block
    pub fn is_fixture_contiguous(&self) -> bool {
        let mut seen = Vec::new();
        let mut current = None;

        for test in &self.tests {
            if current != Some(test.fixture) {
                if seen.contains(&test.fixture) {
                    return false;
                }
                seen.push(test.fixture);
                current = Some(test.fixture);
            }
        }
        true
    }
}

/// Builder assigning ids in insertion order
#[derive(Debug, Default)]
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    #[cfg(test)]
    pub fn lane(mut self, user_agent: impl Into<String>) -> Self {
        self.task.lanes.push(Lane::new(user_agent));
        self
    }

    pub fn add_lane(&mut self, user_agent: impl Into<String>) {
        self.task.lanes.push(Lane::new(user_agent));
    }

    pub fn add_fixture(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> FixtureId {
        let id = FixtureId(self.task.fixtures.len());
        self.task.fixtures.push(Fixture {
            name: name.into(),
            path: path.into(),
        });
        id
    }

    /// Panics if `fixture` was not returned by this builder
    pub fn add_test(&mut self, fixture: FixtureId, name: impl Into<String>) -> TestId {
        assert!(
            fixture.0 < self.task.fixtures.len(),
            "{fixture} was not added to this task"
        );
        let id = TestId(self.task.tests.len());
        self.task.tests.push(TestSpec {
            id,
            name: name.into(),
            fixture,
        });
        id
    }

    pub fn build(self) -> Task {
        self.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_assigns_ids_in_order() {
        let mut builder = Task::builder().lane("Chrome").lane("Firefox");
        let auth = builder.add_fixture("Auth", "tests/auth.js");
        let t1 = builder.add_test(auth, "logs in");
        let t2 = builder.add_test(auth, "logs out");
        let task = builder.build();

        assert_eq!(t1, TestId(0));
        assert_eq!(t2, TestId(1));
        assert_eq!(task.tests().len(), 2);
        assert_eq!(task.user_agents(), vec!["Chrome", "Firefox"]);
        assert_eq!(task.fixture(auth).unwrap().name, "Auth");
    }

    #[test]
    fn test_fixture_contiguity() {
        let mut builder = Task::builder().lane("Chrome");
        let a = builder.add_fixture("A", "a.js");
        let b = builder.add_fixture("B", "b.js");
        builder.add_test(a, "a1");
        builder.add_test(a, "a2");
        builder.add_test(b, "b1");
        assert!(builder.build().is_fixture_contiguous());

        let mut builder = Task::builder().lane("Chrome");
        let a = builder.add_fixture("A", "a.js");
        let b = builder.add_fixture("B", "b.js");
        builder.add_test(a, "a1");
        builder.add_test(b, "b1");
        builder.add_test(a, "a2");
        assert!(!builder.build().is_fixture_contiguous());
    }

    #[test]
    #[should_panic]
    fn test_add_test_unknown_fixture() {
        let mut builder = Task::builder();
        builder.add_test(FixtureId(3), "orphan");
    }
}
