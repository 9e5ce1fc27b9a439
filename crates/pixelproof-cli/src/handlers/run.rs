//! Run command handler

use super::reporter_for;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::RunArgs;
use pixelproof::runner::summarize_reports;
use pixelproof::{RunConfig, RunPlan, RunSelection};

/// Map the run flags onto a test selection.
///
/// `--smoke` wins over `--test`, which wins over `--marker`; more than
/// one parallel thread selects a parallel full run.
#[must_use]
pub fn selection_from_args(args: &RunArgs) -> RunSelection {
    if args.smoke {
        RunSelection::Smoke
    } else if let Some(test) = &args.test {
        RunSelection::Test(test.clone())
    } else if let Some(marker) = &args.marker {
        RunSelection::Marker(marker.clone())
    } else if args.parallel > 1 {
        RunSelection::Parallel(args.parallel)
    } else {
        RunSelection::All
    }
}

/// Settings exported to the test process
pub fn run_config(args: &RunArgs) -> CliResult<RunConfig> {
    let base = RunConfig::from_env()?;
    let headless = args.headless || base.headless;
    Ok(base
        .with_base_url(args.base_url.clone())
        .with_timeout_secs(args.timeout)
        .with_headless(headless))
}

/// Build the run plan
pub fn plan(config: &CliConfig, args: &RunArgs) -> CliResult<RunPlan> {
    let layout = config.layout();
    let mut plan = RunPlan::new(selection_from_args(args), run_config(args)?, &layout.reports);
    if let Some(package) = &args.package {
        plan = plan.with_package(package.clone());
    }
    Ok(plan)
}

/// Execute the run command
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let plan = plan(config, args)?;
    let reporter = reporter_for(config);

    reporter.header(&plan.selection.suite_name());
    reporter.step("🚀", &format!("Testing {}", plan.config.base_url));
    if config.verbosity.is_verbose() {
        reporter.info(&format!("cargo {}", plan.cargo_args().join(" ")));
    }

    let summary = plan.execute()?;
    let results = &summary.reporter;
    reporter.summary(
        results.passed_count(),
        results.failed_count(),
        results.skipped_count(),
        results.total_duration(),
    );
    for failure in results.failures() {
        reporter.failure(&failure.name);
    }

    let reports = summarize_reports(&plan.reports_dir)?;
    if !reports.is_empty() {
        reporter.info("Reports:");
        for report in reports {
            println!("  {}", report.display());
        }
    }

    if summary.success() {
        Ok(())
    } else {
        Err(CliError::TestsFailed {
            code: summary.exit_code,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            smoke: false,
            test: None,
            marker: None,
            parallel: 1,
            headless: false,
            base_url: "http://localhost:8080/".to_string(),
            timeout: 20,
            package: None,
        }
    }

    #[test]
    fn test_selection_precedence() {
        assert_eq!(selection_from_args(&args()), RunSelection::All);

        let mut a = args();
        a.parallel = 4;
        assert_eq!(selection_from_args(&a), RunSelection::Parallel(4));

        a.marker = Some("visual".to_string());
        assert_eq!(selection_from_args(&a), RunSelection::Marker("visual".to_string()));

        a.test = Some("inbox_loads".to_string());
        assert_eq!(
            selection_from_args(&a),
            RunSelection::Test("inbox_loads".to_string())
        );

        a.smoke = true;
        assert_eq!(selection_from_args(&a), RunSelection::Smoke);
    }

    #[test]
    fn test_plan_uses_flags() {
        let config = CliConfig::new().with_root("/srv/site");
        let mut a = args();
        a.headless = true;
        a.package = Some("site-tests".to_string());
        let plan = plan(&config, &a).unwrap();

        assert_eq!(plan.config.base_url, "http://localhost:8080");
        assert_eq!(plan.config.timeout_secs, 20);
        assert!(plan.config.headless);
        assert_eq!(plan.reports_dir, std::path::PathBuf::from("/srv/site/reports"));
        assert_eq!(&plan.cargo_args()[..3], ["test", "-p", "site-tests"]);
    }
}
