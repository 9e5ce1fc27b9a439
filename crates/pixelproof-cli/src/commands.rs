//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pixelproof: visual review and design compliance for web UIs
#[derive(Parser, Debug)]
#[command(name = "pixelproof")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Project root containing screenshots/, reports/, design-specs/ and visual-review/
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, approve or reject a visual review
    Review(ReviewArgs),

    /// Score a screenshot against a baseline
    Compare(CompareArgs),

    /// Convert design SVG exports into baselines
    Convert(ConvertArgs),

    /// Run the browser test suite and write reports
    Run(RunArgs),

    /// Check a live page against a design specification
    Check(CheckArgs),
}

/// Arguments for the review command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReviewArgs {
    /// Component name to review
    #[arg(long)]
    pub component: Option<String>,

    /// Path to the implementation screenshot
    #[arg(long)]
    pub screenshot: Option<PathBuf>,

    /// Path to the design file (PNG, JPEG or SVG)
    #[arg(long)]
    pub figma: Option<PathBuf>,

    /// Design specification whose entries become checklist items
    #[arg(long)]
    pub spec: Option<PathBuf>,

    /// Reviewer name recorded in the checklist
    #[arg(long)]
    pub reviewer: Option<String>,

    /// Approve the implementation
    #[arg(long, conflicts_with = "reject")]
    pub approve: bool,

    /// Reject the implementation
    #[arg(long)]
    pub reject: bool,

    /// Rejection feedback
    #[arg(long)]
    pub feedback: Option<String>,

    /// Show earlier review cycles
    #[arg(long, conflicts_with_all = ["approve", "reject"])]
    pub history: bool,

    /// Previous baselines to keep per component
    #[arg(long, default_value = "5")]
    pub keep_versions: usize,
}

/// Arguments for the compare command
#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Screenshot to score
    pub actual: PathBuf,

    /// Baseline image, or a component name to look up in the baseline store
    pub expected: String,

    /// Minimum similarity (0.0 - 1.0)
    #[arg(short, long, default_value = "0.80")]
    pub threshold: f64,

    /// Write a diff image here when the comparison fails
    #[arg(long)]
    pub diff_dir: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the convert command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Directory of SVG exports
    #[arg(default_value = "messaging-epic-figma-svg")]
    pub svg_dir: PathBuf,

    /// Export width in pixels
    #[arg(long, default_value = "1440")]
    pub width: u32,

    /// Skip external renderers and write placeholders
    #[arg(long)]
    pub placeholder_only: bool,

    /// Write the manual conversion guide to this file
    #[arg(long)]
    pub guide: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Run smoke tests only
    #[arg(long)]
    pub smoke: bool,

    /// Run a specific test (name filter)
    #[arg(long)]
    pub test: Option<String>,

    /// Run tests whose name contains this marker
    #[arg(long)]
    pub marker: Option<String>,

    /// Number of parallel test threads
    #[arg(long, default_value = "1")]
    pub parallel: usize,

    /// Run the browser headless
    #[arg(long)]
    pub headless: bool,

    /// Base URL of the site under test
    #[arg(long, env = "BASE_URL", default_value = pixelproof::config::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Element wait timeout in seconds
    #[arg(long, env = "TIMEOUT", default_value = "10")]
    pub timeout: u64,

    /// Test package to run
    #[arg(short, long)]
    pub package: Option<String>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Specification name under design-specs/ (without .yml) or a path
    pub spec: String,

    /// Page path relative to the base URL
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Check only this component
    #[arg(long)]
    pub component: Option<String>,

    /// Also capture a screenshot of the page
    #[arg(long)]
    pub screenshot: bool,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
