//! Compare command handler

use super::reporter_for;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::CompareArgs;
use pixelproof::{BaselineStore, CompareConfig, ComparisonResult, ProofError, SimilarityComparator};
use std::path::{Path, PathBuf};

/// Execute the compare command.
///
/// A missing baseline or an undecodable image is reported as a skip and
/// exits successfully; only a similarity below the threshold fails.
pub fn execute_compare(config: &CliConfig, args: &CompareArgs) -> CliResult<()> {
    if !(0.0..=1.0).contains(&args.threshold) {
        return Err(CliError::invalid_argument(format!(
            "--threshold must be between 0.0 and 1.0, got {}",
            args.threshold
        )));
    }

    let mut compare = CompareConfig::default().with_threshold(args.threshold);
    if let Some(dir) = &args.diff_dir {
        std::fs::create_dir_all(dir)?;
        compare = compare.with_diff_dir(dir);
    }

    let result = match compare_images(config, args, compare) {
        Ok(result) => result,
        Err(CliError::Proof(err)) if err.is_skip() => {
            report_skip(config, args, &err)?;
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).map_err(ProofError::from)?);
    } else {
        print_result(config, &result);
    }

    if result.passed {
        Ok(())
    } else {
        Err(CliError::BelowThreshold {
            similarity: result.percent(),
            threshold: args.threshold * 100.0,
        })
    }
}

fn compare_images(
    config: &CliConfig,
    args: &CompareArgs,
    compare: CompareConfig,
) -> CliResult<ComparisonResult> {
    let layout = config.layout();
    let store = BaselineStore::new(&layout.baselines, &layout.screenshots);
    let expected = resolve_expected(&store, &args.expected)?;
    Ok(SimilarityComparator::new(compare).compare_files(&args.actual, &expected)?)
}

fn report_skip(config: &CliConfig, args: &CompareArgs, err: &ProofError) -> CliResult<()> {
    tracing::info!(
        actual = %args.actual.display(),
        expected = %args.expected,
        %err,
        "comparison skipped"
    );
    if args.json {
        let skipped = serde_json::json!({ "skipped": true, "reason": err.to_string() });
        println!("{}", serde_json::to_string_pretty(&skipped).map_err(ProofError::from)?);
    } else {
        reporter_for(config).warning(&format!("Comparison skipped: {err}"));
    }
    Ok(())
}

/// An existing image path, or the baseline of the named component
pub fn resolve_expected(store: &BaselineStore, expected: &str) -> CliResult<PathBuf> {
    let path = Path::new(expected);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    store.lookup(expected).ok_or_else(|| {
        CliError::from(ProofError::unavailable(format!(
            "no baseline image for {expected:?} in {}",
            store.baseline_dir().display()
        )))
    })
}

fn print_result(config: &CliConfig, result: &ComparisonResult) {
    let reporter = reporter_for(config);
    let line = format!(
        "{:.1}% similar ({} of {} pixels differ{})",
        result.percent(),
        result.diff_pixel_count,
        result.total_pixels,
        if result.resized { ", baseline resized" } else { "" }
    );
    if result.passed {
        reporter.success(&line);
    } else {
        reporter.failure(&line);
    }
    if let Some(diff) = &result.diff_path {
        reporter.info(&format!("Diff image: {}", diff.display()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn png(path: &Path, rgb: [u8; 3]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbImage::from_pixel(32, 32, image::Rgb(rgb))
            .save(path)
            .unwrap();
    }

    fn args(actual: PathBuf, expected: &str, threshold: f64) -> CompareArgs {
        CompareArgs {
            actual,
            expected: expected.to_string(),
            threshold,
            diff_dir: None,
            json: false,
        }
    }

    #[test]
    fn test_resolve_by_component_name() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::new(dir.path().join("b"), dir.path().join("s"));
        let baseline = store.baseline_path("inbox");
        png(&baseline, [1, 2, 3]);
        assert_eq!(resolve_expected(&store, "inbox").unwrap(), baseline);
        assert!(resolve_expected(&store, "chat_header").is_err());
    }

    #[test]
    fn test_identical_images_pass() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);
        let a = dir.path().join("a.png");
        png(&a, [120, 130, 140]);
        let expected = a.to_string_lossy().into_owned();
        execute_compare(&config, &args(a.clone(), &expected, 0.8)).unwrap();
    }

    #[test]
    fn test_different_images_fail_with_diff() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        png(&a, [0, 0, 0]);
        png(&b, [255, 255, 255]);

        let mut compare = args(a, &b.to_string_lossy(), 0.8);
        compare.diff_dir = Some(dir.path().join("diffs"));
        let err = execute_compare(&config, &compare).unwrap_err();
        assert!(matches!(err, CliError::BelowThreshold { .. }));
        assert!(dir.path().join("diffs/a_diff.png").is_file());
    }

    #[test]
    fn test_missing_baseline_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);
        let a = dir.path().join("a.png");
        png(&a, [10, 20, 30]);
        execute_compare(&config, &args(a, "inbox", 0.8)).unwrap();
    }

    #[test]
    fn test_undecodable_image_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_root(dir.path())
            .with_verbosity(crate::Verbosity::Quiet);
        let a = dir.path().join("a.png");
        let broken = dir.path().join("broken.png");
        png(&a, [10, 20, 30]);
        fs::write(&broken, b"not an image").unwrap();
        execute_compare(&config, &args(a, &broken.to_string_lossy(), 0.8)).unwrap();
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = CliConfig::new();
        let err = execute_compare(&config, &args(PathBuf::from("a.png"), "b.png", 1.5)).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }
}
