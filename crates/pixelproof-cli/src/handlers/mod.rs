//! Command handlers
//!
//! Each handler owns the execution logic for one subcommand plus the
//! pure helpers it needs, so they can be tested without a process.

pub mod check;
pub mod compare;
pub mod convert;
pub mod review;
pub mod run;

use crate::config::CliConfig;
use crate::output::ProgressReporter;
use std::path::{Path, PathBuf};

pub use check::execute_check;
pub use compare::{execute_compare, resolve_expected};
pub use convert::execute_convert;
pub use review::execute_review;
pub use run::{execute_run, selection_from_args};

/// Status printer configured from the CLI flags
#[must_use]
pub fn reporter_for(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}

/// Resolve a relative path against the project root
#[must_use]
pub fn under_root(config: &CliConfig, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config.root.join(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_under_root() {
        let config = CliConfig::new().with_root("/srv/site");
        assert_eq!(
            under_root(&config, Path::new("exports")),
            PathBuf::from("/srv/site/exports")
        );
        assert_eq!(under_root(&config, Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    }
}
