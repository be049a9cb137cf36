//! Reporter plugin writing formatted output to a stream

use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::path::Path;

use super::formatter::{JsonFixture, JsonReport, JsonTest, OutputFormat, ResultFormatter};
use crate::models::{TestError, TestRunInfo};
use crate::reporter::ReporterPlugin;
use crate::utils::elapsed_ms;

/// Writes reporter calls to `W` in the chosen [`OutputFormat`]
///
/// Line formats are written as calls arrive; JSON formats are buffered and
/// written as one document on task done. The first write error is kept and
/// returned from [`StreamPlugin::finish`].
pub struct StreamPlugin<W: Write> {
    out: W,
    formatter: ResultFormatter,
    report: JsonReport,
    current_fixture: String,
    failures: Vec<(String, Vec<TestError>)>,
    error: Option<io::Error>,
}

impl<W: Write> StreamPlugin<W> {
    pub fn new(out: W, formatter: ResultFormatter) -> Self {
        Self {
            out,
            formatter,
            report: JsonReport::default(),
            current_fixture: String::new(),
            failures: Vec::new(),
            error: None,
        }
    }

    fn write(&mut self, text: &str) {
        if self.error.is_some() || text.is_empty() {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            self.error = Some(e);
        }
    }

    fn write_json(&mut self) {
        if self.error.is_some() {
            return;
        }
        let result = if self.formatter.format() == OutputFormat::JsonPretty {
            serde_json::to_writer_pretty(&mut self.out, &self.report)
        } else {
            serde_json::to_writer(&mut self.out, &self.report)
        };
        if let Err(e) = result
            .map_err(io::Error::from)
            .and_then(|_| writeln!(self.out))
        {
            self.error = Some(e);
        }
    }

    /// Return the writer, or the first error hit while writing
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }
}

impl<W: Write> ReporterPlugin for StreamPlugin<W> {
    fn report_task_start(
        &mut self,
        start_time: DateTime<Utc>,
        user_agents: &[String],
        test_count: usize,
    ) {
        self.report.start_time = Some(start_time);
        self.report.user_agents = user_agents.to_vec();
        self.report.total = test_count;

        if !self.formatter.format().is_json() {
            let text = self
                .formatter
                .format_task_start(start_time, user_agents, test_count);
            self.write(&text);
        }
    }

    fn report_fixture_start(&mut self, name: &str, path: &Path) {
        self.current_fixture = name.to_string();
        self.report.fixtures.push(JsonFixture {
            name: name.to_string(),
            path: path.to_path_buf(),
            tests: Vec::new(),
        });

        if !self.formatter.format().is_json() {
            let text = self.formatter.format_fixture_start(name, path);
            self.write(&text);
        }
    }

    fn report_test_done(&mut self, name: &str, info: &TestRunInfo) {
        if let Some(fixture) = self.report.fixtures.last_mut() {
            fixture.tests.push(JsonTest::new(name, info));
        }
        if !info.passed() {
            self.failures.push((
                format!("{} - {}", self.current_fixture, name),
                info.errs.clone(),
            ));
        }

        if !self.formatter.format().is_json() {
            let text = self
                .formatter
                .format_test_done(&self.current_fixture, name, info);
            self.write(&text);
        }
    }

    fn report_task_done(&mut self, end_time: DateTime<Utc>, passed: usize, warnings: &[String]) {
        self.report.end_time = Some(end_time);
        self.report.passed = passed;
        self.report.warnings = warnings.to_vec();

        if self.formatter.format().is_json() {
            self.write_json();
        } else {
            let duration_ms = self
                .report
                .start_time
                .map(|s| elapsed_ms(s, end_time))
                .unwrap_or(0);
            let text = self.formatter.format_task_done(
                passed,
                self.report.total,
                duration_ms,
                warnings,
                &self.failures,
            );
            self.write(&text);
        }
    }
}
