//! Run configuration and on-disk layout.

use crate::result::{ProofError, ProofResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Site under test when `BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "https://skilledup.life";
/// Element wait in seconds when `TIMEOUT` is unset
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Viewport when `WINDOW_SIZE` is unset
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Environment variable names read by [`RunConfig::from_env`]
pub mod env {
    /// Base URL of the site under test
    pub const BASE_URL: &str = "BASE_URL";
    /// Element wait timeout in seconds
    pub const TIMEOUT: &str = "TIMEOUT";
    /// `true`/`false`
    pub const HEADLESS: &str = "HEADLESS";
    /// `WIDTH,HEIGHT`
    pub const WINDOW_SIZE: &str = "WINDOW_SIZE";
}

/// Settings for a browser-driven test run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Base URL of the site under test
    pub base_url: String,
    /// Element wait timeout in seconds
    pub timeout_secs: u64,
    /// Run the browser without a window
    pub headless: bool,
    /// Viewport width
    pub window_width: u32,
    /// Viewport height
    pub window_height: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headless: true,
            window_width: DEFAULT_WINDOW_SIZE.0,
            window_height: DEFAULT_WINDOW_SIZE.1,
        }
    }
}

impl RunConfig {
    /// Read overrides from the process environment
    pub fn from_env() -> ProofResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> ProofResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(env::BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(env::TIMEOUT) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                ProofError::config(format!("{} must be whole seconds, got {raw:?}", env::TIMEOUT))
            })?;
        }
        if let Some(raw) = lookup(env::HEADLESS) {
            config.headless = parse_bool(env::HEADLESS, &raw)?;
        }
        if let Some(raw) = lookup(env::WINDOW_SIZE) {
            let (width, height) = parse_window_size(&raw)?;
            config.window_width = width;
            config.window_height = height;
        }
        Ok(config)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the element wait timeout
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the viewport
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Element wait timeout
    #[must_use]
    pub const fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL for a site path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The settings as environment variables, for child test processes
    #[must_use]
    pub fn to_env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (env::BASE_URL, self.base_url.clone()),
            (env::TIMEOUT, self.timeout_secs.to_string()),
            (env::HEADLESS, self.headless.to_string()),
            (
                env::WINDOW_SIZE,
                format!("{},{}", self.window_width, self.window_height),
            ),
        ]
    }
}

fn parse_bool(key: &str, raw: &str) -> ProofResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ProofError::config(format!(
            "{key} must be true or false, got {raw:?}"
        ))),
    }
}

/// Parse `WIDTH,HEIGHT` (or `WIDTHxHEIGHT`)
pub fn parse_window_size(raw: &str) -> ProofResult<(u32, u32)> {
    let bad = || {
        ProofError::config(format!(
            "{} must look like 1920,1080, got {raw:?}",
            env::WINDOW_SIZE
        ))
    };
    let (w, h) = raw
        .trim()
        .split_once(|c| c == ',' || c == 'x')
        .ok_or_else(bad)?;
    let width: u32 = w.trim().parse().map_err(|_| bad())?;
    let height: u32 = h.trim().parse().map_err(|_| bad())?;
    if width == 0 || height == 0 {
        return Err(bad());
    }
    Ok((width, height))
}

/// Directory layout of a project using pixelproof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Project root
    pub root: PathBuf,
    /// Captured screenshots
    pub screenshots: PathBuf,
    /// HTML and JUnit reports
    pub reports: PathBuf,
    /// Design specification documents
    pub design_specs: PathBuf,
    /// Approved baselines
    pub baselines: PathBuf,
    /// Comparison images, checklists and review reports
    pub review: PathBuf,
}

impl Layout {
    /// Conventional layout under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let design_specs = root.join("design-specs");
        Self {
            screenshots: root.join("screenshots"),
            reports: root.join("reports"),
            baselines: design_specs.join("baselines"),
            review: root.join("visual-review"),
            design_specs,
            root,
        }
    }

    /// Create every directory
    pub fn ensure_all(&self) -> ProofResult<()> {
        for dir in [
            &self.screenshots,
            &self.reports,
            &self.design_specs,
            &self.baselines,
            &self.review,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Specification document for a page or feature, e.g.
    /// `design-specs/company-dashboard-message.yml`
    #[must_use]
    pub fn spec_file(&self, name: &str) -> PathBuf {
        self.design_specs.join(format!("{name}.yml"))
    }

    /// Project root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
