//! Check command handler

use super::reporter_for;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::CheckArgs;
use pixelproof::assertion::check_palette_default;
use pixelproof::{
    capture_screenshot, DesignSpecification, Layout, PageDriver, ProofError, Reporter,
    SpecAssertor, TestResultEntry,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Every distinct computed text and background color on the page
const PAGE_COLORS_JS: &str = "Array.from(new Set(Array.from(document.querySelectorAll('*'))\
    .flatMap(el => { const s = getComputedStyle(el); return [s.color, s.backgroundColor]; })))";

/// A path to an existing file, or `design-specs/<name>.yml`
#[must_use]
pub fn resolve_spec(layout: &Layout, spec: &str) -> PathBuf {
    let path = Path::new(spec);
    if path.is_file() {
        path.to_path_buf()
    } else {
        layout.spec_file(spec)
    }
}

/// Report file for a specification, e.g. `inbox-design-report.html`
#[must_use]
pub fn report_name(spec: &str) -> String {
    let stem = Path::new(spec)
        .file_stem()
        .map_or_else(|| spec.to_string(), |s| s.to_string_lossy().into_owned());
    format!("{stem}-design-report.html")
}

/// Check the loaded page against `spec`, recording every outcome
pub fn check_page<D: PageDriver + ?Sized>(
    driver: &mut D,
    spec: &DesignSpecification,
    layout: &Layout,
    args: &CheckArgs,
) -> CliResult<Reporter> {
    let assertor = SpecAssertor::new(spec);
    let reports = match &args.component {
        Some(component) => vec![assertor.check_component(&*driver, component)?],
        None => assertor.check_all(&*driver)?,
    };

    let mut reporter = Reporter::new().with_name(format!("Design compliance: {}", args.spec));
    for report in &reports {
        tracing::info!(%report, "component checked");
        reporter.record_component(report);
    }

    if !spec.palette().is_empty() && args.component.is_none() {
        let colors: Vec<String> = serde_json::from_value(driver.execute_script(PAGE_COLORS_JS)?)
            .map_err(|e| ProofError::parse(format!("unexpected page colors result: {e}")))?;
        let stray = check_palette_default(spec, &colors);
        reporter.record(if stray.is_empty() {
            TestResultEntry::passed("palette", Duration::ZERO)
        } else {
            TestResultEntry::failed(
                "palette",
                Duration::ZERO,
                format!("colors outside the palette: {}", stray.join(", ")),
            )
        });
    }

    if args.screenshot {
        let name = Path::new(&args.spec)
            .file_stem()
            .map_or_else(|| args.spec.clone(), |s| s.to_string_lossy().into_owned());
        let path = capture_screenshot(driver, &layout.screenshots, &name)?;
        tracing::info!(path = %path.display(), "captured page");
    }

    Ok(reporter)
}

/// Execute the check command
#[cfg(feature = "browser")]
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    use pixelproof::{ChromiumDriver, DriverSession, RunConfig};

    let layout = config.layout();
    let spec = DesignSpecification::load(&resolve_spec(&layout, &args.spec))?;
    let run_config = RunConfig::from_env()?;

    let out = reporter_for(config);
    out.step("🌐", &format!("Opening {}", run_config.url(&args.path)));
    let mut session = DriverSession::new(ChromiumDriver::launch(&run_config)?);
    session.navigate(&run_config.url(&args.path))?;
    let results = check_page(&mut *session, &spec, &layout, args)?;
    session.close()?;

    finish(config, &layout, args, &results)
}

/// Execute the check command
#[cfg(not(feature = "browser"))]
pub fn execute_check(config: &CliConfig, args: &CheckArgs) -> CliResult<()> {
    // fail on a bad spec before complaining about the missing browser
    let layout = config.layout();
    DesignSpecification::load(&resolve_spec(&layout, &args.spec))?;
    Err(CliError::FeatureDisabled { feature: "browser" })
}

/// Write the report and print the outcome
pub fn finish(config: &CliConfig, layout: &Layout, args: &CheckArgs, results: &Reporter) -> CliResult<()> {
    let out = reporter_for(config);
    let report = layout.reports.join(report_name(&args.spec));
    results.write_html(&report)?;

    for failure in results.failures() {
        let message = failure.message.as_deref().unwrap_or("failed");
        out.failure(&format!("{}: {message}", failure.name));
    }
    out.summary(
        results.passed_count(),
        results.failed_count(),
        results.skipped_count(),
        results.total_duration(),
    );
    out.info(&format!("Report: {}", report.display()));

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::Proof(ProofError::Validation {
            message: format!("{} design checks failed", results.failed_count()),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pixelproof::{Locator, MockDriver, MockElement};
    use tempfile::TempDir;

    const SPEC: &str = r##"
post_opportunity_button:
  height: "48px"
  background: "#004AAD"
chat_header:
  height: "64px"
palette:
  primary: "#004AAD"
  white: "#FFFFFF"
"##;

    fn args(component: Option<&str>) -> CheckArgs {
        CheckArgs {
            spec: "company-dashboard-message".to_string(),
            path: "/messages".to_string(),
            component: component.map(String::from),
            screenshot: false,
        }
    }

    fn driver() -> MockDriver {
        MockDriver::new().with_element(
            MockElement::new(Locator::class("post-opportunity-button"), "button")
                .with_size(180.0, 48.0)
                .with_css("background-color", "rgb(0, 74, 173)"),
        )
    }

    #[test]
    fn test_resolve_spec_by_name() {
        let layout = Layout::new("/srv/site");
        assert_eq!(
            resolve_spec(&layout, "inbox"),
            PathBuf::from("/srv/site/design-specs/inbox.yml")
        );
        assert_eq!(report_name("design-specs/inbox.yml"), "inbox-design-report.html");
    }

    #[test]
    fn test_check_single_component() {
        let spec = DesignSpecification::from_yaml_str(SPEC).unwrap();
        let layout = Layout::new("/unused");
        let mut driver = driver();
        let results =
            check_page(&mut driver, &spec, &layout, &args(Some("post_opportunity_button"))).unwrap();
        assert_eq!(results.failed_count(), 0);
        assert_eq!(results.passed_count(), 2);
    }

    #[test]
    fn test_check_all_flags_stray_colors() {
        let spec = DesignSpecification::from_yaml_str(SPEC).unwrap();
        let dir = TempDir::new().unwrap();
        let layout = Layout::new(dir.path());
        let mut driver = driver();
        driver.push_script_result(serde_json::json!([
            "rgb(0, 74, 173)",
            "rgba(0, 0, 0, 0)",
            "rgb(255, 0, 0)"
        ]));

        let results = check_page(&mut driver, &spec, &layout, &args(None)).unwrap();
        // chat_header is absent, so its check is skipped
        assert_eq!(results.skipped_count(), 1);
        let failures = results.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "palette");

        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);
        assert!(finish(&config, &layout, &args(None), &results).is_err());
        assert!(layout.reports.join("company-dashboard-message-design-report.html").is_file());
    }

    #[test]
    fn test_malformed_page_colors_fail() {
        let spec = DesignSpecification::from_yaml_str(SPEC).unwrap();
        let layout = Layout::new("/unused");
        let mut driver = driver();
        driver.push_script_result(serde_json::json!({ "x": 1 }));

        let err = check_page(&mut driver, &spec, &layout, &args(None)).unwrap_err();
        assert!(matches!(err, CliError::Proof(ProofError::Parse { .. })));
        assert!(err.to_string().contains("page colors"));
    }
}
