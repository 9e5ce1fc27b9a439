//! Convert command handler

use super::{reporter_for, under_root};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::ConvertArgs;
use pixelproof::rasterize::{conversion_guide, convert_directory, svg_files, ConversionOutcome};
use pixelproof::{BaselineStore, RasterizerChain};

/// Execute the convert command
pub fn execute_convert(config: &CliConfig, args: &ConvertArgs) -> CliResult<Vec<ConversionOutcome>> {
    let layout = config.layout();
    let svg_dir = under_root(config, &args.svg_dir);
    let store = BaselineStore::new(&layout.baselines, &layout.screenshots);
    let chain = if args.placeholder_only {
        RasterizerChain::placeholder_only()
    } else {
        RasterizerChain::default()
    }
    .with_width(args.width);

    let mut reporter = reporter_for(config);
    let total = if svg_dir.is_dir() { svg_files(&svg_dir)?.len() } else { 0 };
    reporter.start_progress(total as u64, "converting design exports");

    let outcomes = convert_directory(&svg_dir, &store, &chain, |outcome| {
        reporter.set_message(&outcome.component);
        reporter.increment(1);
    });
    reporter.finish();
    let outcomes = outcomes?;

    for outcome in &outcomes {
        if outcome.placeholder {
            reporter.warning(&format!(
                "{}: placeholder written ({})",
                outcome.component,
                outcome.baseline.display()
            ));
        } else {
            reporter.success(&format!(
                "{}: rendered with {}",
                outcome.component, outcome.renderer
            ));
        }
    }

    let placeholders = outcomes.iter().filter(|o| o.placeholder).count();
    reporter.info(&format!(
        "{} baselines written to {} ({placeholders} placeholders)",
        outcomes.len(),
        layout.baselines.display()
    ));

    if let Some(guide) = &args.guide {
        let guide = under_root(config, guide);
        std::fs::write(&guide, conversion_guide())?;
        reporter.info(&format!("Conversion guide: {}", guide.display()));
    } else if placeholders > 0 {
        reporter.info("Pass --guide <file> for manual conversion steps");
    }

    Ok(outcomes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(dir: &str) -> ConvertArgs {
        ConvertArgs {
            svg_dir: PathBuf::from(dir),
            width: 200,
            placeholder_only: true,
            guide: Some(PathBuf::from("CONVERSION.md")),
        }
    }

    #[test]
    fn test_convert_under_root() {
        let dir = TempDir::new().unwrap();
        let exports = dir.path().join("exports");
        fs::create_dir_all(&exports).unwrap();
        fs::write(exports.join("Thread List.svg"), "<svg/>").unwrap();
        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);

        let outcomes = execute_convert(&config, &args("exports")).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].component, "thread_list");
        assert!(outcomes[0].baseline.is_file());
        assert!(dir.path().join("CONVERSION.md").is_file());
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);
        assert!(execute_convert(&config, &args("nowhere")).is_err());
    }
}
