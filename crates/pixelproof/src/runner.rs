//! Orchestration of browser test runs through `cargo test`.
//!
//! A [`RunPlan`] turns a selection (smoke, one test, a marker, parallel)
//! into a `cargo test` invocation, passes the run configuration through
//! the environment, and renders libtest's output as HTML and JUnit
//! reports.

use crate::config::RunConfig;
use crate::reporter::{Reporter, TestResultEntry};
use crate::result::ProofResult;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

/// Test name filter used for the smoke subset
pub const SMOKE_FILTER: &str = "smoke";

/// Which tests to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSelection {
    /// Everything, one test thread
    All,
    /// Tests whose name contains `smoke`
    Smoke,
    /// A single test (name filter)
    Test(String),
    /// Tests whose name contains the marker
    Marker(String),
    /// Everything, across `n` test threads
    Parallel(usize),
}

impl RunSelection {
    /// libtest name filter, if any
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        match self {
            Self::Smoke => Some(SMOKE_FILTER),
            Self::Test(name) | Self::Marker(name) => Some(name),
            Self::All | Self::Parallel(_) => None,
        }
    }

    /// Number of libtest threads
    #[must_use]
    pub fn threads(&self) -> usize {
        match self {
            Self::Parallel(n) => (*n).max(1),
            _ => 1,
        }
    }

    /// File name of the HTML report for this selection
    #[must_use]
    pub fn report_name(&self) -> String {
        match self {
            Self::All => "full-test-report.html".to_string(),
            Self::Smoke => "smoke-test-report.html".to_string(),
            Self::Test(_) => "specific-test-report.html".to_string(),
            Self::Marker(marker) => format!("{marker}-test-report.html"),
            Self::Parallel(_) => "parallel-test-report.html".to_string(),
        }
    }

    /// Human-readable suite name
    #[must_use]
    pub fn suite_name(&self) -> String {
        match self {
            Self::All => "Full test run".to_string(),
            Self::Smoke => "Smoke tests".to_string(),
            Self::Test(name) => format!("Test {name}"),
            Self::Marker(marker) => format!("{marker} tests"),
            Self::Parallel(n) => format!("Parallel run ({} threads)", (*n).max(1)),
        }
    }
}

/// Outcome of an executed run
#[derive(Debug)]
pub struct RunSummary {
    /// Collected results
    pub reporter: Reporter,
    /// HTML report written
    pub html_report: PathBuf,
    /// JUnit report written
    pub junit_report: PathBuf,
    /// Exit code of `cargo test`
    pub exit_code: i32,
}

impl RunSummary {
    /// The underlying test command succeeded
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A planned `cargo test` invocation
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Test selection
    pub selection: RunSelection,
    /// Settings exported to the tests
    pub config: RunConfig,
    /// Report output directory
    pub reports_dir: PathBuf,
    /// Restrict to one workspace package
    pub package: Option<String>,
}

impl RunPlan {
    /// Plan a run writing reports into `reports_dir`
    #[must_use]
    pub fn new(selection: RunSelection, config: RunConfig, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            selection,
            config,
            reports_dir: reports_dir.into(),
            package: None,
        }
    }

    /// Restrict to one package
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Arguments passed to `cargo`
    #[must_use]
    pub fn cargo_args(&self) -> Vec<String> {
        let mut args = vec!["test".to_string()];
        if let Some(package) = &self.package {
            args.push("-p".to_string());
            args.push(package.clone());
        }
        args.push("--".to_string());
        if let Some(filter) = self.selection.filter() {
            args.push(filter.to_string());
        }
        args.push("--test-threads".to_string());
        args.push(self.selection.threads().to_string());
        args
    }

    /// Environment passed to the test process
    #[must_use]
    pub fn envs(&self) -> Vec<(&'static str, String)> {
        self.config.to_env_pairs()
    }

    /// HTML report path
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.reports_dir.join(self.selection.report_name())
    }

    /// JUnit report path (next to the HTML report)
    #[must_use]
    pub fn junit_path(&self) -> PathBuf {
        self.report_path().with_extension("xml")
    }

    /// Run `cargo test`, then write both reports.
    ///
    /// A failing test run is not an error; its exit code is returned in
    /// the summary.
    pub fn execute(&self) -> ProofResult<RunSummary> {
        std::fs::create_dir_all(&self.reports_dir)?;
        let args = self.cargo_args();
        tracing::info!(args = ?args, "running cargo");

        let start = Instant::now();
        let output = Command::new("cargo").args(&args).envs(self.envs()).output()?;
        let elapsed = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut reporter = Reporter::new().with_name(self.selection.suite_name());
        for entry in parse_libtest_output(&stdout) {
            reporter.record(entry);
        }
        reporter.set_elapsed(elapsed);

        let exit_code = output.status.code().unwrap_or(1);
        if !output.status.success() && reporter.total_count() == 0 {
            tracing::warn!(
                exit_code,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "cargo test failed before running any test"
            );
        }

        let html_report = self.report_path();
        let junit_report = self.junit_path();
        reporter.write_html(&html_report)?;
        reporter.write_junit(&junit_report)?;
        tracing::info!(report = %html_report.display(), summary = %reporter.summary(), "run finished");

        Ok(RunSummary {
            reporter,
            html_report,
            junit_report,
            exit_code,
        })
    }
}

/// Parse libtest's default (pretty) output into report entries.
///
/// Failure messages come from the `---- name stdout ----` sections
/// printed after the run.
#[must_use]
pub fn parse_libtest_output(stdout: &str) -> Vec<TestResultEntry> {
    let mut entries = Vec::new();
    for line in stdout.lines() {
        let Some(rest) = line.strip_prefix("test ") else {
            continue;
        };
        let Some((name, status)) = rest.rsplit_once(" ... ") else {
            continue;
        };
        let name = name.trim();
        let entry = match status.trim() {
            "ok" => TestResultEntry::passed(name, Duration::ZERO),
            "FAILED" => TestResultEntry::failed(name, Duration::ZERO, "test failed"),
            s if s.starts_with("ignored") => {
                let reason = s
                    .strip_prefix("ignored,")
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                TestResultEntry::skipped(name, reason)
            }
            _ => continue,
        };
        entries.push(entry);
    }

    for (name, message) in failure_sections(stdout) {
        if let Some(entry) = entries
            .iter_mut()
            .find(|e| e.name == name && e.status.is_failed())
        {
            entry.message = Some(message);
        }
    }
    entries
}

fn failure_sections(stdout: &str) -> Vec<(String, String)> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in stdout.lines() {
        if let Some(name) = line
            .strip_prefix("---- ")
            .and_then(|rest| rest.strip_suffix(" stdout ----"))
        {
            if let Some((name, body)) = current.take() {
                sections.push((name, body.join("\n").trim().to_string()));
            }
            current = Some((name.to_string(), Vec::new()));
            continue;
        }
        if line.starts_with("failures:") || line.starts_with("test result:") {
            if let Some((name, body)) = current.take() {
                sections.push((name, body.join("\n").trim().to_string()));
            }
            continue;
        }
        if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((name, body)) = current {
        sections.push((name, body.join("\n").trim().to_string()));
    }
    sections.retain(|(_, body)| !body.is_empty());
    sections
}

/// HTML and JUnit reports in `dir`, sorted by name
pub fn summarize_reports(dir: &Path) -> ProofResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut reports: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "html" || e == "xml")
        })
        .collect();
    reports.sort();
    Ok(reports)
}
