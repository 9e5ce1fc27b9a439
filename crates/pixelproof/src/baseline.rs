//! Approved reference images, one per component.
//!
//! A baseline lives at `<baseline_dir>/<component>_baseline.png`. Approving
//! a new one moves the previous image into `<baseline_dir>/history/` so the
//! last few approvals can be inspected or restored.

use crate::archive;
use crate::lock::ComponentLock;
use crate::result::{ProofError, ProofResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name suffix of an approved baseline
pub const BASELINE_SUFFIX: &str = "_baseline.png";

/// Prior baselines kept per component
pub const DEFAULT_KEEP_VERSIONS: usize = 5;

/// Design export names that do not normalize to their component id
const NAME_ALIASES: &[(&str, &str)] = &[
    ("company_dashboard___message", "company_dashboard"),
    ("company_dashboard___message_1", "company_dashboard_variant_1"),
    ("company_dashboard___message_2", "company_dashboard_variant_2"),
    ("volunteer_dashboard___message", "volunteer_dashboard"),
    ("volunteer_dashboard___message_1", "volunteer_dashboard_variant_1"),
];

/// Map a human or design-export name to a component id.
///
/// Lowercases, replaces spaces and hyphens with underscores, drops a
/// trailing `.svg`/`.png`, then applies the alias table. The result is
/// deterministic and idempotent.
#[must_use]
pub fn normalize_component_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    let stem = [".svg", ".png"]
        .iter()
        .find_map(|ext| lower.strip_suffix(*ext))
        .unwrap_or(lower.as_str());

    let name: String = stem
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map_or(name, |(_, to)| (*to).to_string())
}

/// Reject names that cannot safely become file names
pub fn validate_component_name(name: &str) -> ProofResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProofError::parse("component name must not be empty"));
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(ProofError::parse(format!(
            "component name {name:?} must not contain path separators"
        )));
    }
    Ok(())
}

/// Filesystem store of approved baselines
#[derive(Debug, Clone)]
pub struct BaselineStore {
    baseline_dir: PathBuf,
    screenshots_dir: PathBuf,
    keep_versions: usize,
}

impl BaselineStore {
    /// Create a store over a baseline directory and the screenshots it approves from
    #[must_use]
    pub fn new(baseline_dir: impl Into<PathBuf>, screenshots_dir: impl Into<PathBuf>) -> Self {
        Self {
            baseline_dir: baseline_dir.into(),
            screenshots_dir: screenshots_dir.into(),
            keep_versions: DEFAULT_KEEP_VERSIONS,
        }
    }

    /// Set how many prior baselines to keep per component
    #[must_use]
    pub const fn with_keep_versions(mut self, keep: usize) -> Self {
        self.keep_versions = keep;
        self
    }

    /// Baseline directory
    #[must_use]
    pub fn baseline_dir(&self) -> &Path {
        &self.baseline_dir
    }

    /// Screenshots directory
    #[must_use]
    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// Path the baseline for `component` lives at (whether or not it exists)
    #[must_use]
    pub fn baseline_path(&self, component: &str) -> PathBuf {
        let name = normalize_component_name(component);
        self.baseline_dir.join(format!("{name}{BASELINE_SUFFIX}"))
    }

    /// Existing baseline for `component`
    #[must_use]
    pub fn lookup(&self, component: &str) -> Option<PathBuf> {
        let path = self.baseline_path(component);
        path.is_file().then_some(path)
    }

    /// Most recently created screenshot whose name contains the component name
    pub fn latest_screenshot(&self, component: &str) -> ProofResult<PathBuf> {
        validate_component_name(component)?;
        let raw = component.trim().to_lowercase();
        let normalized = normalize_component_name(component);

        let pattern = format!(
            "{}/*.png",
            glob::Pattern::escape(&self.screenshots_dir.to_string_lossy())
        );
        let paths = glob::glob(&pattern)
            .map_err(|e| ProofError::config(format!("bad screenshots directory: {e}")))?;

        let newest = paths
            .filter_map(Result::ok)
            .filter(|path| {
                path.file_stem().is_some_and(|stem| {
                    let stem = stem.to_string_lossy().to_lowercase();
                    stem.contains(&raw) || stem.contains(&normalized)
                })
            })
            .map(|path| (created_at(&path), path))
            .max();

        newest
            .map(|(_, path)| path)
            .ok_or_else(|| ProofError::NoScreenshotFound {
                component: component.to_string(),
                dir: self.screenshots_dir.display().to_string(),
            })
    }

    /// Promote the newest matching screenshot to the component's baseline
    pub fn approve(&self, component: &str) -> ProofResult<PathBuf> {
        let screenshot = self.latest_screenshot(component)?;
        let path = self.install(component, &screenshot)?;
        tracing::info!(
            component,
            screenshot = %screenshot.display(),
            baseline = %path.display(),
            "approved baseline"
        );
        Ok(path)
    }

    /// Install `source` as the baseline for `component`, archiving the current one
    pub fn install(&self, component: &str, source: &Path) -> ProofResult<PathBuf> {
        validate_component_name(component)?;
        let name = normalize_component_name(component);
        fs::create_dir_all(&self.baseline_dir)?;
        let _lock = ComponentLock::acquire(&self.baseline_dir, &name)?;

        // the current baseline is archived only once the copy succeeded
        let staging = self.baseline_dir.join(format!(".{name}_baseline.tmp"));
        if let Err(err) = fs::copy(source, &staging) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        let target = self.baseline_path(&name);
        if target.is_file() {
            self.archive(&name, &target)?;
        }
        fs::rename(&staging, &target)?;
        Ok(target)
    }

    /// Archived baselines for `component`, newest first
    pub fn versions(&self, component: &str) -> ProofResult<Vec<PathBuf>> {
        let name = normalize_component_name(component);
        let mut versions = archive::list(&self.history_dir(), &format!("{name}_baseline."), "png")?;
        versions.reverse();
        Ok(versions)
    }

    fn history_dir(&self) -> PathBuf {
        self.baseline_dir.join("history")
    }

    fn archive(&self, name: &str, current: &Path) -> ProofResult<()> {
        let history = self.history_dir();
        fs::create_dir_all(&history)?;

        let archived = archive::next_path(&history, &format!("{name}_baseline."), "png");
        fs::rename(current, &archived)?;
        tracing::debug!(archived = %archived.display(), "archived previous baseline");

        for stale in self.versions(name)?.into_iter().skip(self.keep_versions) {
            fs::remove_file(&stale)?;
            tracing::debug!(removed = %stale.display(), "pruned old baseline");
        }
        Ok(())
    }
}

fn created_at(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
