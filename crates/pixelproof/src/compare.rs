//! Screenshot similarity scoring against approved baselines.
//!
//! The score is `1 - mean(|Δchannel|) / 255` over every RGB channel of
//! every pixel, after the expected image has been resampled to the
//! actual image's dimensions. Identical images score 1.0; solid white
//! against solid black scores 0.0.

use crate::result::{ProofError, ProofResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageEncoder, Rgba, RgbaImage};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Minimum similarity for a comparison to pass
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.80;

/// Summed RGB delta above which a pixel is painted red in the diff image
pub const DIFF_PIXEL_THRESHOLD: u32 = 10;

/// Configuration for similarity comparisons
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    /// Minimum similarity (0.0-1.0) for a pass
    pub threshold: f64,
    /// Directory for diff images of failed comparisons (none written if unset)
    pub diff_dir: Option<PathBuf>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            diff_dir: None,
        }
    }
}

impl CompareConfig {
    /// Set the pass threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Write diff images for failed comparisons into `dir`
    #[must_use]
    pub fn with_diff_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diff_dir = Some(dir.into());
        self
    }
}

/// Outcome of one similarity comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Similarity in [0.0, 1.0]
    pub similarity: f64,
    /// Identifier of the actual image (usually its path)
    pub actual: String,
    /// Identifier of the expected image
    pub expected: String,
    /// Threshold the similarity was judged against
    pub threshold: f64,
    /// Whether `similarity >= threshold`
    pub passed: bool,
    /// Whether the expected image had to be resampled
    pub resized: bool,
    /// Pixels whose summed RGB delta exceeds [`DIFF_PIXEL_THRESHOLD`]
    pub diff_pixel_count: usize,
    /// Pixels compared
    pub total_pixels: usize,
    /// Diff image written for a failed comparison
    pub diff_path: Option<PathBuf>,
}

impl ComparisonResult {
    /// Similarity as a percentage
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.similarity * 100.0
    }
}

/// Scores screenshots against baselines
#[derive(Debug, Clone, Default)]
pub struct SimilarityComparator {
    config: CompareConfig,
}

impl SimilarityComparator {
    /// Create a comparator with configuration
    #[must_use]
    pub const fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two image files.
    ///
    /// A missing or undecodable file yields
    /// [`ProofError::ComparisonUnavailable`], never a failing score.
    pub fn compare_files(&self, actual: &Path, expected: &Path) -> ProofResult<ComparisonResult> {
        let actual_img = load_image(actual, "actual")?;
        let expected_img = load_image(expected, "baseline")?;

        let scored = score(&actual_img, &expected_img)?;
        let passed = scored.similarity >= self.config.threshold;

        let diff_path = match (&self.config.diff_dir, passed) {
            (Some(dir), false) => {
                let stem = actual
                    .file_stem()
                    .map_or_else(|| "image".to_string(), |s| s.to_string_lossy().into_owned());
                let path = dir.join(format!("{stem}_diff.png"));
                write_diff(&scored.diff_image, &path)?;
                Some(path)
            }
            _ => None,
        };

        tracing::debug!(
            actual = %actual.display(),
            expected = %expected.display(),
            similarity = scored.similarity,
            passed,
            "compared screenshot"
        );

        Ok(ComparisonResult {
            similarity: scored.similarity,
            actual: actual.display().to_string(),
            expected: expected.display().to_string(),
            threshold: self.config.threshold,
            passed,
            resized: scored.resized,
            diff_pixel_count: scored.diff_pixel_count,
            total_pixels: scored.total_pixels,
            diff_path,
        })
    }

    /// Compare two decoded images
    pub fn compare_images(
        &self,
        actual: &DynamicImage,
        expected: &DynamicImage,
    ) -> ProofResult<ComparisonResult> {
        let scored = score(actual, expected)?;
        Ok(ComparisonResult {
            similarity: scored.similarity,
            actual: "<memory>".to_string(),
            expected: "<memory>".to_string(),
            threshold: self.config.threshold,
            passed: scored.similarity >= self.config.threshold,
            resized: scored.resized,
            diff_pixel_count: scored.diff_pixel_count,
            total_pixels: scored.total_pixels,
            diff_path: None,
        })
    }

    /// Compare two encoded images (PNG or JPEG bytes)
    pub fn compare_bytes(&self, actual: &[u8], expected: &[u8]) -> ProofResult<ComparisonResult> {
        let actual_img = image::load_from_memory(actual)
            .map_err(|e| ProofError::unavailable(format!("cannot decode actual image: {e}")))?;
        let expected_img = image::load_from_memory(expected)
            .map_err(|e| ProofError::unavailable(format!("cannot decode baseline image: {e}")))?;
        self.compare_images(&actual_img, &expected_img)
    }
}

/// Similarity of two images, resampling `expected` to the size of `actual`
pub fn similarity(actual: &DynamicImage, expected: &DynamicImage) -> ProofResult<f64> {
    score(actual, expected).map(|s| s.similarity)
}

struct Scored {
    similarity: f64,
    resized: bool,
    diff_pixel_count: usize,
    total_pixels: usize,
    diff_image: RgbaImage,
}

fn score(actual: &DynamicImage, expected: &DynamicImage) -> ProofResult<Scored> {
    let (width, height) = actual.dimensions();
    let (exp_width, exp_height) = expected.dimensions();

    if width == 0 || height == 0 || exp_width == 0 || exp_height == 0 {
        return Err(ProofError::unavailable(format!(
            "cannot compare zero-area images ({width}x{height} vs {exp_width}x{exp_height})"
        )));
    }

    let resized = width != exp_width || height != exp_height;
    let actual_rgba = actual.to_rgba8();
    let expected_rgba = if resized {
        expected.resize_exact(width, height, FilterType::Lanczos3).to_rgba8()
    } else {
        expected.to_rgba8()
    };

    let mut diff_img = RgbaImage::new(width, height);
    let mut total_delta: u64 = 0;
    let mut diff_pixel_count = 0usize;

    for (x, y, actual_pixel) in actual_rgba.enumerate_pixels() {
        let expected_pixel = expected_rgba.get_pixel(x, y);
        let delta = pixel_diff(*actual_pixel, *expected_pixel);
        total_delta += u64::from(delta);

        if delta > DIFF_PIXEL_THRESHOLD {
            diff_pixel_count += 1;
            diff_img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
        } else {
            let Rgba([r, g, b, _]) = *actual_pixel;
            diff_img.put_pixel(x, y, Rgba([r / 2, g / 2, b / 2, 128]));
        }
    }

    let total_pixels = (u64::from(width) * u64::from(height)) as usize;
    let channel_samples = total_pixels as f64 * 3.0;
    let mean_delta = total_delta as f64 / channel_samples;
    let similarity = (1.0 - mean_delta / 255.0).clamp(0.0, 1.0);

    Ok(Scored {
        similarity,
        resized,
        diff_pixel_count,
        total_pixels,
        diff_image: diff_img,
    })
}

fn load_image(path: &Path, role: &str) -> ProofResult<DynamicImage> {
    if !path.exists() {
        return Err(ProofError::unavailable(format!(
            "{role} image not found: {}",
            path.display()
        )));
    }
    image::open(path).map_err(|e| {
        ProofError::unavailable(format!("cannot decode {role} image {}: {e}", path.display()))
    })
}

fn write_diff(diff: &RgbaImage, path: &Path) -> ProofResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            diff.as_raw(),
            diff.width(),
            diff.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| ProofError::image(format!("failed to encode diff image: {e}")))?;
    std::fs::write(path, buffer)?;
    Ok(())
}

/// Sum of absolute RGB channel differences
fn pixel_diff(a: Rgba<u8>, b: Rgba<u8>) -> u32 {
    let Rgba([r1, g1, b1, _]) = a;
    let Rgba([r2, g2, b2, _]) = b;
    u32::from(r1.abs_diff(r2)) + u32::from(g1.abs_diff(g2)) + u32::from(b1.abs_diff(b2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    fn save(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_identical_images_score_one() {
        let img = solid(100, 100, [10, 200, 30]);
        let result = SimilarityComparator::default()
            .compare_images(&img, &img)
            .unwrap();
        assert!((result.similarity - 1.0).abs() < f64::EPSILON);
        assert!(result.passed);
        assert!(!result.resized);
        assert_eq!(result.diff_pixel_count, 0);
    }

    #[test]
    fn test_white_vs_black_scores_zero() {
        let white = solid(100, 100, [255, 255, 255]);
        let black = solid(100, 100, [0, 0, 0]);
        let result = SimilarityComparator::default()
            .compare_images(&white, &black)
            .unwrap();
        assert!(result.similarity.abs() < f64::EPSILON);
        assert!(!result.passed);
        assert_eq!(result.diff_pixel_count, result.total_pixels);
    }

    #[test]
    fn test_different_sizes_are_resampled() {
        let actual = solid(200, 100, [120, 120, 120]);
        let expected = solid(100, 50, [120, 120, 120]);
        let result = SimilarityComparator::default()
            .compare_images(&actual, &expected)
            .unwrap();
        assert!(result.resized);
        assert!(result.similarity > 0.99);
        assert_eq!(result.total_pixels, 200 * 100);
    }

    #[test]
    fn test_half_changed_image() {
        let mut buffer = image::RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        for y in 0..5 {
            for x in 0..10 {
                buffer.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let actual = DynamicImage::ImageRgb8(buffer);
        let expected = solid(10, 10, [0, 0, 0]);
        let score = similarity(&actual, &expected).unwrap();
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let comparator = SimilarityComparator::new(CompareConfig::default().with_threshold(0.5));
        let mut buffer = image::RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        buffer.put_pixel(0, 0, Rgb([255, 255, 255]));
        let result = comparator
            .compare_images(
                &DynamicImage::ImageRgb8(buffer),
                &solid(2, 1, [0, 0, 0]),
            )
            .unwrap();
        assert!((result.similarity - 0.5).abs() < 1e-9);
        assert!(result.passed);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let actual = save(dir.path(), "actual.png", &solid(4, 4, [0, 0, 0]));
        let err = SimilarityComparator::default()
            .compare_files(&actual, &dir.path().join("missing.png"))
            .unwrap_err();
        assert!(matches!(err, ProofError::ComparisonUnavailable { .. }));
        assert!(err.is_skip());
    }

    #[test]
    fn test_undecodable_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let actual = save(dir.path(), "actual.png", &solid(4, 4, [0, 0, 0]));
        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").unwrap();
        let err = SimilarityComparator::default()
            .compare_files(&actual, &junk)
            .unwrap_err();
        assert!(matches!(err, ProofError::ComparisonUnavailable { .. }));
    }

    #[test]
    fn test_failed_comparison_writes_diff() {
        let dir = TempDir::new().unwrap();
        let actual = save(dir.path(), "inbox.png", &solid(8, 8, [255, 255, 255]));
        let expected = save(dir.path(), "inbox_baseline.png", &solid(8, 8, [0, 0, 0]));
        let diffs = dir.path().join("diffs");
        let comparator = SimilarityComparator::new(CompareConfig::default().with_diff_dir(&diffs));

        let result = comparator.compare_files(&actual, &expected).unwrap();
        assert!(!result.passed);
        let diff_path = result.diff_path.unwrap();
        assert_eq!(diff_path, diffs.join("inbox_diff.png"));
        let diff = image::open(&diff_path).unwrap().to_rgba8();
        assert_eq!(diff.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_passing_comparison_writes_no_diff() {
        let dir = TempDir::new().unwrap();
        let actual = save(dir.path(), "a.png", &solid(8, 8, [40, 40, 40]));
        let diffs = dir.path().join("diffs");
        let comparator = SimilarityComparator::new(CompareConfig::default().with_diff_dir(&diffs));
        let result = comparator.compare_files(&actual, &actual).unwrap();
        assert!(result.passed);
        assert!(result.diff_path.is_none());
        assert!(!diffs.exists());
    }

    #[test]
    fn test_compare_bytes_rejects_garbage() {
        let err = SimilarityComparator::default()
            .compare_bytes(b"nope", b"nope")
            .unwrap_err();
        assert!(err.is_skip());
    }
}
