//! HTML and JUnit reports for test runs.

use crate::assertion::{CheckOutcome, ComponentReport};
use crate::compare::ComparisonResult;
use crate::result::ProofResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Skipped => "skip",
        }
    }
}

/// Individual test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// Test name
    pub name: String,
    /// Test status
    pub status: TestStatus,
    /// Duration of test execution
    pub duration: Duration,
    /// Failure message or skip reason
    pub message: Option<String>,
}

impl TestResultEntry {
    /// Create a passing test result
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            duration,
            message: None,
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            duration,
            message: Some(error.into()),
        }
    }

    /// Create a skipped test result
    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skipped,
            duration: Duration::ZERO,
            message: reason,
        }
    }
}

/// Collects results and renders reports.
///
/// Every result is kept; a failure never stops collection.
#[derive(Debug, Default)]
pub struct Reporter {
    suite_name: String,
    results: Vec<TestResultEntry>,
    comparisons: Vec<(String, ComparisonResult)>,
    elapsed: Option<Duration>,
}

impl Reporter {
    /// Create new reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "Pixelproof Report".to_string(),
            ..Default::default()
        }
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.suite_name
    }

    /// Record a test result
    pub fn record(&mut self, result: TestResultEntry) {
        self.results.push(result);
    }

    /// Record every check of a component as a test result
    pub fn record_component(&mut self, report: &ComponentReport) {
        for check in &report.checks {
            let name = format!("{}.{}", check.component, check.attribute);
            let entry = match &check.outcome {
                CheckOutcome::Passed => TestResultEntry::passed(name, Duration::ZERO),
                CheckOutcome::Failed(msg) => TestResultEntry::failed(name, Duration::ZERO, msg),
                CheckOutcome::Skipped(reason) => TestResultEntry::skipped(name, Some(reason.clone())),
            };
            self.record(entry);
        }
    }

    /// Record a screenshot comparison; it also counts as a test result
    pub fn record_comparison(&mut self, name: impl Into<String>, comparison: ComparisonResult) {
        let name = name.into();
        let entry = if comparison.passed {
            TestResultEntry::passed(name.clone(), Duration::ZERO)
        } else {
            TestResultEntry::failed(
                name.clone(),
                Duration::ZERO,
                format!(
                    "similarity {:.1}% below threshold {:.1}%",
                    comparison.percent(),
                    comparison.threshold * 100.0
                ),
            )
        };
        self.record(entry);
        self.comparisons.push((name, comparison));
    }

    /// Set wall-clock duration of the run (defaults to the sum of test durations)
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = Some(elapsed);
    }

    /// Get passed test count
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Get failed test count
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Get skipped test count
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// Get total test count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Fraction of non-skipped tests that passed (1.0 when none ran)
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let ran = self.passed_count() + self.failed_count();
        if ran == 0 {
            1.0
        } else {
            self.passed_count() as f64 / ran as f64
        }
    }

    /// No failures recorded
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Total duration
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.elapsed
            .unwrap_or_else(|| self.results.iter().map(|r| r.duration).sum())
    }

    /// All results
    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    /// Failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} skipped ({:.1}% pass rate)",
            self.suite_name,
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0
        )
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Write the HTML report
    pub fn write_html(&self, output_path: &Path) -> ProofResult<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, self.render_html())?;
        Ok(())
    }

    /// Render a self-contained HTML report
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();

        html.push_str(&format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }}
        .summary {{ background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }}
        .progress-bar {{ background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }}
        .passed {{ background: #4caf50; height: 100%; }}
        .test {{ padding: 10px; margin: 5px 0; border-radius: 4px; }}
        .test.pass {{ background: #e8f5e9; border-left: 4px solid #4caf50; }}
        .test.fail {{ background: #ffebee; border-left: 4px solid #f44336; }}
        .test.skip {{ background: #fff3e0; border-left: 4px solid #ff9800; }}
        .message {{ font-family: monospace; white-space: pre-wrap; }}
        .fail .message {{ color: #d32f2f; }}
        table {{ border-collapse: collapse; }}
        td, th {{ padding: 4px 12px; border-bottom: 1px solid #ddd; text-align: left; }}
    </style>
</head>
<body>
"#,
            title = escape_html(&self.suite_name)
        ));

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>{} passed, {} failed, {} skipped</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {:.1}%"></div>
    </div>
    <p>Duration: {:.2}s</p>
</div>
"#,
            escape_html(&self.suite_name),
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0,
            self.total_duration().as_secs_f64()
        ));

        html.push_str("<h2>Test Results</h2>\n");
        for result in &self.results {
            html.push_str(&format!(
                r#"<div class="test {}">
    <strong>{}</strong> - {:?} ({:.2}ms)
"#,
                result.status.css_class(),
                escape_html(&result.name),
                result.status,
                result.duration.as_secs_f64() * 1000.0
            ));
            if let Some(message) = &result.message {
                html.push_str(&format!(
                    "    <div class=\"message\">{}</div>\n",
                    escape_html(message)
                ));
            }
            html.push_str("</div>\n");
        }

        if !self.comparisons.is_empty() {
            html.push_str("<h2>Screenshot Comparisons</h2>\n<table>\n");
            html.push_str("<tr><th>Name</th><th>Similarity</th><th>Threshold</th><th>Diff</th></tr>\n");
            for (name, comparison) in &self.comparisons {
                let diff = comparison
                    .diff_path
                    .as_ref()
                    .map_or_else(String::new, |p| escape_html(&p.display().to_string()));
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{:.1}%</td><td>{:.1}%</td><td>{}</td></tr>\n",
                    escape_html(name),
                    comparison.percent(),
                    comparison.threshold * 100.0,
                    diff
                ));
            }
            html.push_str("</table>\n");
        }

        html.push_str(
            r"
<footer>
    <p>Generated by Pixelproof</p>
</footer>
</body>
</html>
",
        );
        html
    }

    /// Write the JUnit XML report
    pub fn write_junit(&self, output_path: &Path) -> ProofResult<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_path, self.render_junit())?;
        Ok(())
    }

    /// Render JUnit XML content
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<testsuite name="{}" tests="{}" failures="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        ));
        xml.push('\n');

        for result in &self.results {
            xml.push_str(&format!(
                r#"  <testcase name="{}" time="{:.3}">"#,
                escape_xml(&result.name),
                result.duration.as_secs_f64()
            ));
            xml.push('\n');

            match (result.status, &result.message) {
                (TestStatus::Failed, message) => {
                    let message = message.as_deref().unwrap_or("failed");
                    xml.push_str(&format!(
                        r#"    <failure message="{}">{}</failure>"#,
                        escape_xml(message),
                        escape_xml(message)
                    ));
                    xml.push('\n');
                }
                (TestStatus::Skipped, Some(reason)) => {
                    xml.push_str(&format!(r#"    <skipped message="{}"/>"#, escape_xml(reason)));
                    xml.push('\n');
                }
                (TestStatus::Skipped, None) => xml.push_str("    <skipped/>\n"),
                (TestStatus::Passed, _) => {}
            }

            xml.push_str("  </testcase>\n");
        }

        xml.push_str("</testsuite>\n");
        xml
    }
}

/// Escape text for HTML element content and attribute values
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
