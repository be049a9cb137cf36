//! Output formatters for reporter calls
//!
//! Provides spec, list, minimal, and JSON renderings of a task's results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::models::{TestError, TestRunInfo};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tests grouped under fixture headings, errors in full
    Spec,
    /// One line per test, prefixed with its fixture
    List,
    /// One character per test, errors at the end
    Minimal,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "spec" => Some(OutputFormat::Spec),
            "list" => Some(OutputFormat::List),
            "minimal" => Some(OutputFormat::Minimal),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }
}

/// Text formatter for the line-oriented formats
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn format_task_start(
        &self,
        start_time: DateTime<Utc>,
        user_agents: &[String],
        test_count: usize,
    ) -> String {
        match self.format {
            OutputFormat::Minimal => {
                format!("Running {test_count} tests in: {}\n\n", user_agents.join(", "))
            }
            _ => {
                let mut output = format!("Running {test_count} tests in:\n");
                for ua in user_agents {
                    output.push_str(&format!(" - {}\n", self.paint("34", ua)));
                }
                output.push_str(&format!(
                    "Started at {}\n",
                    start_time.format("%Y-%m-%d %H:%M:%S UTC")
                ));
                output
            }
        }
    }

    pub fn format_fixture_start(&self, name: &str, path: &Path) -> String {
        match self.format {
            OutputFormat::Spec => format!("\n {} ({})\n", self.paint("1", name), path.display()),
            _ => String::new(),
        }
    }

    pub fn format_test_done(&self, fixture: &str, name: &str, info: &TestRunInfo) -> String {
        match self.format {
            OutputFormat::Minimal => {
                if info.passed() {
                    self.paint("32", ".")
                } else {
                    self.paint("31", "!")
                }
            }
            OutputFormat::List => {
                let mut output = format!(
                    "{} {} - {} [{}ms]",
                    self.status_symbol(info),
                    fixture,
                    name,
                    info.duration_ms
                );
                output.push_str(&self.format_flags(info));
                output.push('\n');
                output.push_str(&self.format_errors(&info.errs, 4));
                output
            }
            _ => {
                let mut output = format!(
                    " {} {} [{}ms]",
                    self.status_symbol(info),
                    name,
                    info.duration_ms
                );
                output.push_str(&self.format_flags(info));
                output.push('\n');
                output.push_str(&self.format_errors(&info.errs, 4));
                output
            }
        }
    }

    fn status_symbol(&self, info: &TestRunInfo) -> String {
        if info.passed() {
            self.paint("32", info.symbol())
        } else {
            self.paint("31", info.symbol())
        }
    }

    fn format_flags(&self, info: &TestRunInfo) -> String {
        let mut output = String::new();
        if info.unstable {
            output.push_str(&format!(" {}", self.paint("33", "(unstable)")));
        }
        if let Some(path) = &info.screenshot_path {
            output.push_str(&format!(" (screenshots: {})", path.display()));
        }
        output
    }

    fn format_errors(&self, errs: &[TestError], indent: usize) -> String {
        let pad = " ".repeat(indent);
        errs.iter()
            .enumerate()
            .map(|(i, e)| format!("{pad}{}) {}\n", i + 1, e))
            .collect()
    }

    pub fn format_task_done(
        &self,
        passed: usize,
        total: usize,
        duration_ms: u64,
        warnings: &[String],
        failures: &[(String, Vec<TestError>)],
    ) -> String {
        let mut output = String::new();

        if self.format == OutputFormat::Minimal {
            output.push_str("\n\n");
            for (name, errs) in failures {
                output.push_str(&format!(" {}\n", self.paint("31", name)));
                output.push_str(&self.format_errors(errs, 4));
            }
        }

        let failed = total - passed.min(total);
        let verdict = if failed == 0 {
            self.paint("32", &format!("{passed} passed"))
        } else {
            self.paint("31", &format!("{failed}/{total} failed"))
        };
        output.push_str(&format!(
            "\n {} ({:.3}s)\n",
            verdict,
            duration_ms as f64 / 1000.0
        ));

        if !warnings.is_empty() {
            output.push_str(&format!(
                "\n {}\n",
                self.paint("33", &format!("Warnings ({}):", warnings.len()))
            ));
            for warning in warnings {
                output.push_str(&format!("  - {warning}\n"));
            }
        }

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Spec)
    }
}

/// JSON document written once the task is done
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub user_agents: Vec<String>,
    pub total: usize,
    pub passed: usize,
    pub fixtures: Vec<JsonFixture>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JsonFixture {
    pub name: String,
    pub path: PathBuf,
    pub tests: Vec<JsonTest>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonTest {
    pub name: String,
    pub errs: Vec<TestError>,
    pub duration_ms: u64,
    pub unstable: bool,
    pub screenshot_path: Option<PathBuf>,
}

impl JsonTest {
    pub fn new(name: &str, info: &TestRunInfo) -> Self {
        Self {
            name: name.to_string(),
            errs: info.errs.clone(),
            duration_ms: info.duration_ms,
            unstable: info.unstable,
            screenshot_path: info.screenshot_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() -> TestRunInfo {
        TestRunInfo {
            errs: vec![TestError::new("Chrome", "assertion", "expected 1 to equal 2")],
            duration_ms: 12,
            unstable: true,
            screenshot_path: Some(PathBuf::from("shots/1.png")),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("SPEC"), Some(OutputFormat::Spec));
        assert_eq!(OutputFormat::from_str("unknown"), None);
        assert!(OutputFormat::JsonPretty.is_json());
    }

    #[test]
    fn test_formatter_creation() {
        let formatter = ResultFormatter::new(OutputFormat::List).no_color();
        assert_eq!(formatter.format, OutputFormat::List);
        assert!(!formatter.colorize);
    }

    #[test]
    fn test_format_spec_test_done() {
        let formatter = ResultFormatter::new(OutputFormat::Spec).no_color();
        let output = formatter.format_test_done("Auth", "logs in", &failing());

        assert_eq!(
            output,
            " ✗ logs in [12ms] (unstable) (screenshots: shots/1.png)\n    1) [Chrome] assertion: expected 1 to equal 2\n"
        );
    }

    #[test]
    fn test_format_list_includes_fixture() {
        let formatter = ResultFormatter::new(OutputFormat::List).no_color();
        let info = TestRunInfo {
            errs: Vec::new(),
            duration_ms: 3,
            unstable: false,
            screenshot_path: None,
        };
        assert_eq!(
            formatter.format_test_done("Auth", "logs in", &info),
            "✓ Auth - logs in [3ms]\n"
        );
    }

    #[test]
    fn test_format_minimal() {
        let formatter = ResultFormatter::new(OutputFormat::Minimal).no_color();
        assert_eq!(formatter.format_test_done("Auth", "logs in", &failing()), "!");
        assert_eq!(formatter.format_fixture_start("Auth", Path::new("auth.js")), "");
    }

    #[test]
    fn test_format_task_done() {
        let formatter = ResultFormatter::new(OutputFormat::Spec).no_color();
        let output = formatter.format_task_done(1, 2, 1500, &["deprecated API".to_string()], &[]);

        assert!(output.contains("1/2 failed (1.500s)"));
        assert!(output.contains("Warnings (1):"));
        assert!(output.contains("  - deprecated API"));
    }
}
