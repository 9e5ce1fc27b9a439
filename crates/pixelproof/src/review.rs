//! Review sessions for one UI component.
//!
//! A review cycle builds a side-by-side comparison image, writes a
//! pending checklist and an HTML report, then ends in exactly one
//! decision: approve (the latest screenshot becomes the baseline) or
//! reject (with feedback). Starting a new cycle archives the previous
//! checklist instead of overwriting it.

use crate::baseline::{validate_component_name, BaselineStore};
use crate::checklist::{CheckStatus, ChecklistStore, ReviewChecklist};
use crate::compose;
use crate::config::Layout;
use crate::rasterize::RasterizerChain;
use crate::reporter::escape_html;
use crate::result::{ProofError, ProofResult};
use image::DynamicImage;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Size of the stand-in image when the design file is missing
pub const MISSING_DESIGN_SIZE: (u32, u32) = (400, 300);

/// Directories a review touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPaths {
    /// Comparison images, checklists and reports
    pub review_dir: PathBuf,
    /// Approved baselines
    pub baseline_dir: PathBuf,
    /// Captured screenshots
    pub screenshots_dir: PathBuf,
}

impl ReviewPaths {
    /// Paths from a project layout
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            review_dir: layout.review.clone(),
            baseline_dir: layout.baselines.clone(),
            screenshots_dir: layout.screenshots.clone(),
        }
    }
}

/// Drives review cycles over the checklist and baseline stores
#[derive(Debug)]
pub struct ReviewManager {
    paths: ReviewPaths,
    checklists: ChecklistStore,
    baselines: BaselineStore,
    rasterizer: RasterizerChain,
}

impl ReviewManager {
    /// Manager with the default renderer chain
    #[must_use]
    pub fn new(paths: ReviewPaths) -> Self {
        Self {
            checklists: ChecklistStore::new(&paths.review_dir),
            baselines: BaselineStore::new(&paths.baseline_dir, &paths.screenshots_dir),
            rasterizer: RasterizerChain::default(),
            paths,
        }
    }

    /// Use a different renderer chain for vector designs
    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: RasterizerChain) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Keep at most `keep` previous baselines per component
    #[must_use]
    pub fn with_keep_versions(mut self, keep: usize) -> Self {
        self.baselines = self.baselines.with_keep_versions(keep);
        self
    }

    /// Directories in use
    #[must_use]
    pub const fn paths(&self) -> &ReviewPaths {
        &self.paths
    }

    /// Checklist store
    #[must_use]
    pub const fn checklists(&self) -> &ChecklistStore {
        &self.checklists
    }

    /// Baseline store
    #[must_use]
    pub const fn baselines(&self) -> &BaselineStore {
        &self.baselines
    }

    /// Path of the comparison image for `name`
    #[must_use]
    pub fn comparison_path(&self, name: &str) -> PathBuf {
        self.paths.review_dir.join(format!("{name}_comparison.png"))
    }

    /// Path of the HTML report for `name`
    #[must_use]
    pub fn report_path(&self, name: &str) -> PathBuf {
        self.paths.review_dir.join(format!("{name}_review.html"))
    }

    /// Build `<name>_comparison.png` from a screenshot and a design.
    ///
    /// An SVG design goes through the renderer chain. A missing design is
    /// replaced by a placeholder so the reviewer still sees the screenshot.
    pub fn create_comparison(&self, name: &str, screenshot: &Path, design: &Path) -> ProofResult<PathBuf> {
        validate_component_name(name)?;
        fs::create_dir_all(&self.paths.review_dir)?;

        let implementation = open_image(screenshot)?;
        let design_image = self.load_design(name, design)?;

        let canvas = compose::side_by_side(
            &format!("Visual Review: {name}"),
            &implementation,
            &design_image,
        );
        let output = self.comparison_path(name);
        canvas
            .save(&output)
            .map_err(|e| ProofError::image(format!("{}: {e}", output.display())))?;
        tracing::info!(component = name, path = %output.display(), "created comparison image");
        Ok(output)
    }

    fn load_design(&self, name: &str, design: &Path) -> ProofResult<DynamicImage> {
        if !design.is_file() {
            tracing::warn!(component = name, design = %design.display(), "design file missing, using placeholder");
            let (width, height) = MISSING_DESIGN_SIZE;
            let label = format!("Design not found: {name}");
            return Ok(DynamicImage::ImageRgba8(compose::placeholder(
                width,
                height,
                &[label.as_str()],
            )));
        }

        let is_svg = design
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        if !is_svg {
            return open_image(design);
        }

        let staging = self.paths.review_dir.join(format!(".{name}_design.png"));
        let outcome = self.rasterizer.rasterize(design, &staging)?;
        if outcome.placeholder {
            tracing::warn!(component = name, "design shown as placeholder; manual conversion required");
        }
        let image = open_image(&outcome.path);
        fs::remove_file(&outcome.path)?;
        image
    }

    /// Open a fresh pending review; any current checklist is archived
    pub fn create_checklist(&self, name: &str, specs: &[(String, String)]) -> ProofResult<PathBuf> {
        validate_component_name(name)?;
        let (_, path) = self.checklists.start_fresh(name, specs)?;
        tracing::info!(component = name, path = %path.display(), "created review checklist");
        Ok(path)
    }

    /// Render `<name>_review.html` from the current checklist
    pub fn generate_report(&self, name: &str) -> ProofResult<PathBuf> {
        validate_component_name(name)?;
        let checklist = self.checklists.load(name)?;
        let comparison = self.comparison_path(name);
        let html = render_report(&checklist, comparison.is_file().then_some(comparison.as_path()));

        let output = self.report_path(name);
        fs::write(&output, html)?;
        tracing::info!(component = name, path = %output.display(), "generated review report");
        Ok(output)
    }

    /// Approve the pending review and promote the latest screenshot.
    ///
    /// The checklist stays pending when no screenshot exists.
    pub fn approve(&self, name: &str) -> ProofResult<ReviewChecklist> {
        validate_component_name(name)?;
        self.checklists.update(name, |checklist| {
            checklist.ensure_pending("approve")?;
            self.baselines.approve(name)?;
            checklist.approve()
        })
    }

    /// Reject the pending review with feedback
    pub fn reject(&self, name: &str, feedback: &str) -> ProofResult<ReviewChecklist> {
        validate_component_name(name)?;
        if feedback.trim().is_empty() {
            return Err(ProofError::MissingFeedback);
        }
        let checklist = self
            .checklists
            .update(name, |checklist| checklist.reject(feedback))?;
        tracing::info!(component = name, "rejected review");
        Ok(checklist)
    }

    /// Record a reviewer's verdict on one check of the pending review
    pub fn mark_check(
        &self,
        name: &str,
        check: &str,
        status: CheckStatus,
        notes: Option<&str>,
    ) -> ProofResult<ReviewChecklist> {
        validate_component_name(name)?;
        self.checklists.update(name, |checklist| {
            checklist.ensure_pending("mark")?;
            checklist.mark(check, status, notes)
        })
    }

    /// Current checklist
    pub fn current(&self, name: &str) -> ProofResult<ReviewChecklist> {
        validate_component_name(name)?;
        self.checklists.load(name)
    }

    /// Earlier review cycles, oldest first
    pub fn history(&self, name: &str) -> ProofResult<Vec<ReviewChecklist>> {
        validate_component_name(name)?;
        self.checklists.history(name)
    }
}

fn open_image(path: &Path) -> ProofResult<DynamicImage> {
    image::open(path).map_err(|e| ProofError::image(format!("{}: {e}", path.display())))
}

fn render_report(checklist: &ReviewChecklist, comparison: Option<&Path>) -> String {
    let name = escape_html(&checklist.component);
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Visual Review: {name}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }}
        .status {{ display: inline-block; padding: 4px 12px; border-radius: 4px; color: #fff; }}
        .status.pending {{ background: #ff9800; }}
        .status.approved {{ background: #4caf50; }}
        .status.rejected {{ background: #f44336; }}
        .check {{ padding: 8px; margin: 4px 0; background: #f5f5f5; border-radius: 4px; }}
        .check-pending {{ border-left: 4px solid #ff9800; }}
        .check-pass {{ border-left: 4px solid #4caf50; }}
        .check-fail {{ border-left: 4px solid #f44336; }}
        .feedback {{ background: #ffebee; padding: 10px; border-left: 4px solid #f44336; }}
        img {{ max-width: 100%; border: 1px solid #ddd; }}
        code {{ background: #f5f5f5; padding: 2px 6px; }}
    </style>
</head>
<body>
<h1>Visual Review: {name}</h1>
<p>Opened {date}</p>
<p><span class="status {status}">{status}</span></p>
"#,
        date = escape_html(&checklist.review_date),
        status = checklist.status,
    );

    if let Some(reviewer) = &checklist.reviewer {
        let _ = writeln!(html, "<p>Reviewer: {}</p>", escape_html(reviewer));
    }
    if let Some(feedback) = &checklist.feedback {
        let _ = writeln!(html, "<div class=\"feedback\">{}</div>", escape_html(feedback));
    }

    if let Some(path) = comparison {
        let file = path
            .file_name()
            .map_or_else(String::new, |f| f.to_string_lossy().into_owned());
        let _ = writeln!(
            html,
            "<h2>Comparison</h2>\n<img src=\"{}\" alt=\"Implementation and design side by side\">",
            escape_html(&file)
        );
    }

    html.push_str("<h2>Checklist</h2>\n");
    for (check, item) in checklist.checks.iter() {
        let status = item.status;
        let _ = write!(
            html,
            "<div class=\"check check-{status}\"><strong>{}</strong> [{status}]: {}",
            escape_html(check),
            escape_html(&item.description)
        );
        if !item.notes.is_empty() {
            let _ = write!(html, "<br><em>{}</em>", escape_html(&item.notes));
        }
        html.push_str("</div>\n");
    }

    let _ = write!(
        html,
        r#"<h2>Decision</h2>
<p>Approve: <code>pixelproof review --component {name} --approve</code></p>
<p>Reject: <code>pixelproof review --component {name} --reject --feedback "..."</code></p>
</body>
</html>
"#
    );
    html
}
