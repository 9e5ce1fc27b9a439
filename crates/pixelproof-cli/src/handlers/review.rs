//! Review command handler

use super::reporter_for;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::ReviewArgs;
use pixelproof::{DesignSpecification, ProofError, ReviewChecklist, ReviewManager, ReviewPaths};
use std::path::{Path, PathBuf};

/// Paths written when a review is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedReview {
    /// Side-by-side comparison image
    pub comparison: PathBuf,
    /// Pending checklist
    pub checklist: PathBuf,
    /// HTML review report
    pub report: PathBuf,
}

/// Execute the review command
pub fn execute_review(config: &CliConfig, args: &ReviewArgs) -> CliResult<()> {
    let component = required_component(args)?;
    let reporter = reporter_for(config);
    let manager = ReviewManager::new(ReviewPaths::from_layout(&config.layout()))
        .with_keep_versions(args.keep_versions);

    if args.history {
        return show_history(&manager, component);
    }

    if args.approve {
        let checklist = manager.approve(component)?;
        reporter.success(&format!("{component} approved"));
        if let Some(baseline) = manager.baselines().lookup(component) {
            println!("Baseline: {}", baseline.display());
        }
        print_decision(&checklist);
        return Ok(());
    }

    if args.reject {
        let feedback = args
            .feedback
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| CliError::invalid_argument("--feedback required when rejecting"))?;
        let checklist = manager.reject(component, feedback)?;
        reporter.warning(&format!("{component} rejected"));
        print_decision(&checklist);
        return Ok(());
    }

    let (Some(screenshot), Some(design)) = (&args.screenshot, &args.figma) else {
        return Err(CliError::invalid_argument(
            "--screenshot and --figma are required to create a review \
             (or pass --approve, --reject or --history)",
        ));
    };

    let created = create_review(
        &manager,
        &reporter,
        component,
        screenshot,
        design,
        args.spec.as_deref(),
        args.reviewer.as_deref(),
    )?;

    println!("Comparison: {}", created.comparison.display());
    println!("Checklist:  {}", created.checklist.display());
    println!("Report:     {}", created.report.display());
    println!();
    println!("Approve with: pixelproof review --component {component} --approve");
    println!("Reject with:  pixelproof review --component {component} --reject --feedback \"...\"");
    Ok(())
}

/// The `--component` value, which every review action needs
pub fn required_component(args: &ReviewArgs) -> CliResult<&str> {
    args.component
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CliError::invalid_argument("--component is required"))
}

/// Open a pending review: comparison image, checklist and report
pub fn create_review(
    manager: &ReviewManager,
    reporter: &ProgressReporter,
    component: &str,
    screenshot: &Path,
    design: &Path,
    spec: Option<&Path>,
    reviewer: Option<&str>,
) -> CliResult<CreatedReview> {
    let spec_checks = match spec {
        Some(path) => DesignSpecification::load(path)?.check_entries(component),
        None => Vec::new(),
    };

    reporter.step("🖼️ ", &format!("Building comparison for {component}"));
    let comparison = manager.create_comparison(component, screenshot, design)?;

    reporter.step("📋", "Writing checklist");
    let checklist = manager.create_checklist(component, &spec_checks)?;
    if let Some(name) = reviewer {
        let name = name.to_string();
        manager.checklists().update(component, move |c| {
            c.reviewer = Some(name);
            Ok(())
        })?;
    }

    let report = manager.generate_report(component)?;
    reporter.success(&format!("Review opened for {component}"));

    Ok(CreatedReview {
        comparison,
        checklist,
        report,
    })
}

fn print_decision(checklist: &ReviewChecklist) {
    println!("Status: {}", checklist.status);
    if let Some(date) = checklist
        .approval_date
        .as_deref()
        .or(checklist.rejection_date.as_deref())
    {
        println!("Decided: {date}");
    }
    if let Some(feedback) = &checklist.feedback {
        println!("Feedback: {feedback}");
    }
}

/// Earlier review cycles followed by the current one, oldest first
pub fn review_history(manager: &ReviewManager, component: &str) -> CliResult<Vec<ReviewChecklist>> {
    let mut reviews = manager.history(component)?;
    match manager.current(component) {
        Ok(current) => reviews.push(current),
        Err(ProofError::ChecklistNotFound { .. }) => {}
        Err(err) => return Err(err.into()),
    }
    Ok(reviews)
}

fn show_history(manager: &ReviewManager, component: &str) -> CliResult<()> {
    let reviews = review_history(manager, component)?;
    if reviews.is_empty() {
        println!("No reviews recorded for {component}");
        return Ok(());
    }

    for checklist in &reviews {
        let feedback = checklist.feedback.as_deref().unwrap_or("");
        println!(
            "{}  {:<8}  {}",
            checklist.review_date, checklist.status, feedback
        );
    }
    Ok(())
}
