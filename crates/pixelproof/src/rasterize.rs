//! Turning vector design exports into PNG baselines.
//!
//! External renderers are tried in order; when none is installed or all
//! fail, a placeholder image that asks for manual conversion is written
//! instead so the pipeline never stalls on a missing tool.

use crate::baseline::{normalize_component_name, BaselineStore};
use crate::compose::placeholder;
use crate::result::{ProofError, ProofResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Export width for rendered designs
pub const DEFAULT_EXPORT_WIDTH: u32 = 1440;
/// Per-file renderer timeout
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Placeholder height
pub const PLACEHOLDER_HEIGHT: u32 = 900;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Something that can render an SVG file to PNG
pub trait VectorRasterizer: fmt::Debug {
    /// Renderer name for logs and outcomes
    fn name(&self) -> &str;

    /// Render `svg` to a PNG at `output`, `width` pixels wide
    fn rasterize(&self, svg: &Path, output: &Path, width: u32) -> ProofResult<()>;
}

/// Renderer that shells out to an external program.
///
/// Argument templates may contain `{input}`, `{output}` and `{width}`.
#[derive(Debug, Clone)]
pub struct CommandRasterizer {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRasterizer {
    /// Create a renderer from a program and argument templates
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    /// `cairosvg` command-line renderer
    #[must_use]
    pub fn cairosvg() -> Self {
        Self::new(
            "cairosvg",
            "cairosvg",
            &["{input}", "--output-width", "{width}", "-o", "{output}"],
        )
    }

    /// Inkscape 1.x renderer
    #[must_use]
    pub fn inkscape() -> Self {
        Self::new(
            "inkscape",
            "inkscape",
            &[
                "--export-type=png",
                "--export-width={width}",
                "--export-filename={output}",
                "{input}",
            ],
        )
    }

    /// librsvg renderer
    #[must_use]
    pub fn rsvg_convert() -> Self {
        Self::new(
            "rsvg-convert",
            "rsvg-convert",
            &["-w", "{width}", "-f", "png", "-o", "{output}", "{input}"],
        )
    }

    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Expand the argument templates for one invocation
    #[must_use]
    pub fn expand_args(&self, svg: &Path, output: &Path, width: u32) -> Vec<String> {
        let input = svg.to_string_lossy();
        let output = output.to_string_lossy();
        let width = width.to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{width}", &width)
            })
            .collect()
    }
}

impl VectorRasterizer for CommandRasterizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn rasterize(&self, svg: &Path, output: &Path, width: u32) -> ProofResult<()> {
        let mut child = Command::new(&self.program)
            .args(self.expand_args(svg, output, width))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ProofError::Rasterize {
                message: format!("{} unavailable: {e}", self.program),
            })?;

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if start.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProofError::Rasterize {
                    message: format!(
                        "{} timed out after {}s on {}",
                        self.program,
                        self.timeout.as_secs(),
                        svg.display()
                    ),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(ProofError::Rasterize {
                message: format!("{} exited with {status} on {}", self.program, svg.display()),
            });
        }
        if !output.is_file() {
            return Err(ProofError::Rasterize {
                message: format!("{} produced no output for {}", self.program, svg.display()),
            });
        }
        Ok(())
    }
}

/// Writes a "manual conversion required" image
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRasterizer;

impl VectorRasterizer for PlaceholderRasterizer {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn rasterize(&self, svg: &Path, output: &Path, width: u32) -> ProofResult<()> {
        let file = svg
            .file_name()
            .map_or_else(String::new, |f| f.to_string_lossy().into_owned());
        let source = format!("Source: {file}");
        let lines = [
            "Manual conversion required",
            source.as_str(),
            "",
            "Export this frame as PNG at 1440px wide",
            "and save it over this file",
        ];
        let img = placeholder(width, PLACEHOLDER_HEIGHT, &lines);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        img.save(output)
            .map_err(|e| ProofError::image(format!("cannot write placeholder: {e}")))?;
        Ok(())
    }
}

/// Which renderer produced an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterOutcome {
    /// Rendered PNG
    pub path: PathBuf,
    /// Renderer that succeeded
    pub renderer: String,
    /// True when every real renderer failed and a placeholder was written
    pub placeholder: bool,
}

/// Ordered renderers with a placeholder fallback
#[derive(Debug)]
pub struct RasterizerChain {
    renderers: Vec<Box<dyn VectorRasterizer + Send + Sync>>,
    width: u32,
}

impl Default for RasterizerChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(CommandRasterizer::cairosvg()),
            Box::new(CommandRasterizer::inkscape()),
            Box::new(CommandRasterizer::rsvg_convert()),
        ])
    }
}

impl RasterizerChain {
    /// Chain over the given renderers
    #[must_use]
    pub fn new(renderers: Vec<Box<dyn VectorRasterizer + Send + Sync>>) -> Self {
        Self {
            renderers,
            width: DEFAULT_EXPORT_WIDTH,
        }
    }

    /// Chain that only ever writes placeholders
    #[must_use]
    pub fn placeholder_only() -> Self {
        Self::new(Vec::new())
    }

    /// Set the export width
    #[must_use]
    pub const fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Export width
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Render `svg` to `output` with the first renderer that succeeds
    pub fn rasterize(&self, svg: &Path, output: &Path) -> ProofResult<RasterOutcome> {
        if !svg.is_file() {
            return Err(ProofError::Rasterize {
                message: format!("design file not found: {}", svg.display()),
            });
        }
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        for renderer in &self.renderers {
            match renderer.rasterize(svg, output, self.width) {
                Ok(()) => {
                    tracing::debug!(renderer = renderer.name(), svg = %svg.display(), "rendered design");
                    return Ok(RasterOutcome {
                        path: output.to_path_buf(),
                        renderer: renderer.name().to_string(),
                        placeholder: false,
                    });
                }
                Err(e) => {
                    tracing::debug!(renderer = renderer.name(), error = %e, "renderer failed");
                }
            }
        }

        tracing::warn!(svg = %svg.display(), "no renderer succeeded, writing placeholder");
        PlaceholderRasterizer.rasterize(svg, output, self.width)?;
        Ok(RasterOutcome {
            path: output.to_path_buf(),
            renderer: PlaceholderRasterizer.name().to_string(),
            placeholder: true,
        })
    }
}

/// Result of converting one design export into a baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Source SVG
    pub source: PathBuf,
    /// Normalized component id
    pub component: String,
    /// Installed baseline
    pub baseline: PathBuf,
    /// Renderer that produced it
    pub renderer: String,
    /// Whether the baseline is a placeholder
    pub placeholder: bool,
}

/// SVG files in `svg_dir`, sorted by name
pub fn svg_files(svg_dir: &Path) -> ProofResult<Vec<PathBuf>> {
    let pattern = format!("{}/*.svg", glob::Pattern::escape(&svg_dir.to_string_lossy()));
    let paths = glob::glob(&pattern)
        .map_err(|e| ProofError::config(format!("bad design directory: {e}")))?;
    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

/// Convert every SVG in `svg_dir` into a baseline in `store`.
///
/// `on_file` is called after each file, for progress display.
pub fn convert_directory<F>(
    svg_dir: &Path,
    store: &BaselineStore,
    chain: &RasterizerChain,
    mut on_file: F,
) -> ProofResult<Vec<ConversionOutcome>>
where
    F: FnMut(&ConversionOutcome),
{
    if !svg_dir.is_dir() {
        return Err(ProofError::config(format!(
            "design directory not found: {}",
            svg_dir.display()
        )));
    }

    let files = svg_files(svg_dir)?;
    if files.is_empty() {
        return Err(ProofError::config(format!(
            "no SVG files found in {}",
            svg_dir.display()
        )));
    }

    let mut outcomes = Vec::with_capacity(files.len());
    for svg in files {
        let file_name = svg
            .file_name()
            .map_or_else(String::new, |f| f.to_string_lossy().into_owned());
        let component = normalize_component_name(&file_name);
        let staging = store.baseline_dir().join(format!(".{component}_render.png"));

        let rendered = chain.rasterize(&svg, &staging)?;
        let baseline = store.install(&component, &staging)?;
        fs::remove_file(&staging)?;

        let outcome = ConversionOutcome {
            source: svg,
            component,
            baseline,
            renderer: rendered.renderer,
            placeholder: rendered.placeholder,
        };
        tracing::info!(
            component = %outcome.component,
            renderer = %outcome.renderer,
            placeholder = outcome.placeholder,
            "converted design export"
        );
        on_file(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Instructions for converting design exports by hand
#[must_use]
pub fn conversion_guide() -> &'static str {
    r"# Design Export Conversion Guide

Automatic conversion writes a placeholder baseline when no renderer is
available. Replace each placeholder with a real export.

## Option 1: export from the design tool

1. Open the design file and select the frame.
2. Export as PNG at 1x, 1440px wide.
3. Save it as `design-specs/baselines/<component>_baseline.png`.

## Option 2: install a renderer and rerun

- cairosvg: `pip install cairosvg`
- Inkscape: `brew install inkscape` or `apt install inkscape`
- librsvg: `brew install librsvg` or `apt install librsvg2-bin`

Then run `pixelproof convert` again.

## Option 3: browser screenshot

Open the SVG in a browser at 1440px wide, take a full-page screenshot,
and save it under the baseline name above.

## Naming

Export names are lowercased with spaces and hyphens turned into
underscores. `Company Dashboard - Message.svg` becomes
`company_dashboard`, and its numbered variants become
`company_dashboard_variant_1` and `company_dashboard_variant_2`.
"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;

    #[derive(Debug)]
    struct Failing(Arc<AtomicUsize>);

    impl VectorRasterizer for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn rasterize(&self, _svg: &Path, _output: &Path, _width: u32) -> ProofResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ProofError::Rasterize {
                message: "nope".into(),
            })
        }
    }

    #[derive(Debug)]
    struct Solid;

    impl VectorRasterizer for Solid {
        fn name(&self) -> &str {
            "solid"
        }
        fn rasterize(&self, _svg: &Path, output: &Path, width: u32) -> ProofResult<()> {
            image::RgbImage::from_pixel(width, 10, image::Rgb([0, 74, 173]))
                .save(output)
                .unwrap();
            Ok(())
        }
    }

    fn write_svg(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, SVG).unwrap();
        path
    }

    #[test]
    fn test_expand_args() {
        let args = CommandRasterizer::inkscape().expand_args(
            Path::new("in.svg"),
            Path::new("out.png"),
            1440,
        );
        assert_eq!(
            args,
            vec![
                "--export-type=png",
                "--export-width=1440",
                "--export-filename=out.png",
                "in.svg"
            ]
        );
        let args =
            CommandRasterizer::rsvg_convert().expand_args(Path::new("a.svg"), Path::new("b.png"), 800);
        assert_eq!(args, vec!["-w", "800", "-f", "png", "-o", "b.png", "a.svg"]);
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let dir = TempDir::new().unwrap();
        let svg = write_svg(dir.path(), "a.svg");
        let renderer = CommandRasterizer::new("ghost", "pixelproof-no-such-renderer", &["{input}"]);
        let err = renderer
            .rasterize(&svg, &dir.path().join("a.png"), 100)
            .unwrap_err();
        assert!(matches!(err, ProofError::Rasterize { .. }));
    }

    #[test]
    fn test_chain_falls_back_to_placeholder() {
        let dir = TempDir::new().unwrap();
        let svg = write_svg(dir.path(), "Inbox.svg");
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = RasterizerChain::new(vec![
            Box::new(Failing(Arc::clone(&calls))),
            Box::new(Failing(Arc::clone(&calls))),
        ]);

        let out = dir.path().join("inbox.png");
        let outcome = chain.rasterize(&svg, &out).unwrap();
        assert!(outcome.placeholder);
        assert_eq!(outcome.renderer, "placeholder");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let img = image::open(&out).unwrap();
        assert_eq!(img.dimensions(), (DEFAULT_EXPORT_WIDTH, PLACEHOLDER_HEIGHT));
    }

    #[test]
    fn test_chain_stops_at_first_success() {
        let dir = TempDir::new().unwrap();
        let svg = write_svg(dir.path(), "a.svg");
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = RasterizerChain::new(vec![
            Box::new(Solid),
            Box::new(Failing(Arc::clone(&calls))),
        ])
        .with_width(64);

        let outcome = chain.rasterize(&svg, &dir.path().join("a.png")).unwrap();
        assert_eq!(outcome.renderer, "solid");
        assert!(!outcome.placeholder);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chain_rejects_missing_svg() {
        let dir = TempDir::new().unwrap();
        let err = RasterizerChain::placeholder_only()
            .rasterize(&dir.path().join("missing.svg"), &dir.path().join("x.png"))
            .unwrap_err();
        assert!(matches!(err, ProofError::Rasterize { .. }));
    }

    #[test]
    fn test_convert_directory_installs_baselines() {
        let dir = TempDir::new().unwrap();
        let svgs = dir.path().join("svg");
        fs::create_dir_all(&svgs).unwrap();
        write_svg(&svgs, "Company Dashboard - Message.svg");
        write_svg(&svgs, "Volunteer Dashboard - Message-1.svg");
        fs::write(svgs.join("notes.txt"), "ignored").unwrap();

        let store = BaselineStore::new(dir.path().join("baselines"), dir.path().join("shots"));
        let chain = RasterizerChain::new(vec![Box::new(Solid)]).with_width(32);
        let mut seen = Vec::new();
        let outcomes =
            convert_directory(&svgs, &store, &chain, |o| seen.push(o.component.clone())).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(seen, vec!["company_dashboard", "volunteer_dashboard_variant_1"]);
        assert!(store.lookup("company_dashboard").is_some());
        assert!(store.lookup("volunteer_dashboard_variant_1").is_some());
        let leftovers: Vec<_> = fs::read_dir(store.baseline_dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains("_render"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_convert_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::new(dir.path().join("b"), dir.path().join("s"));
        let err = convert_directory(
            &dir.path().join("nope"),
            &store,
            &RasterizerChain::placeholder_only(),
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, ProofError::Config { .. }));
    }

    #[test]
    fn test_convert_empty_directory() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::new(dir.path().join("b"), dir.path().join("s"));
        let err = convert_directory(dir.path(), &store, &RasterizerChain::placeholder_only(), |_| {})
            .unwrap_err();
        assert!(err.to_string().contains("no SVG files"));
    }

    #[test]
    fn test_guide_mentions_naming() {
        assert!(conversion_guide().contains("company_dashboard_variant_1"));
    }
}
