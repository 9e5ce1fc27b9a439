//! Status lines and progress bars

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Emoji-prefixed status output on stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    fn line(&self, emoji: &str, styled: Option<Style>, message: &str) {
        let text = match styled {
            Some(s) if self.use_color => s.apply_to(message).to_string(),
            _ => message.to_string(),
        };
        let line = format!("{emoji} {text}");
        if let Some(ref pb) = self.progress_bar {
            pb.println(line);
        } else {
            let _ = self.term.write_line(&line);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line("✅", Some(Style::new().green()), message);
        }
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // failures print even in quiet mode
        self.line("❌", Some(Style::new().red().bold()), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line("⚠️ ", Some(Style::new().yellow()), message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line("ℹ️ ", None, message);
        }
    }

    /// Print a message with a custom emoji
    pub fn step(&self, emoji: &str, message: &str) {
        if !self.quiet {
            self.line(emoji, None, message);
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print a run summary
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let total = passed + failed + skipped;
        let secs = duration.as_secs_f64();
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        let status = if self.use_color {
            let s = if failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().green().bold()
            };
            s.apply_to(status).to_string()
        } else {
            status.to_string()
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "{status} {total} tests in {secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
        ));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_reporter_has_no_progress_bar() {
        let mut reporter = ProgressReporter::new(false, true);
        reporter.start_progress(3, "converting");
        assert!(reporter.progress_bar.is_none());
        reporter.increment(1);
        reporter.finish();
    }

    #[test]
    fn test_progress_lifecycle() {
        let mut reporter = ProgressReporter::new(false, false);
        reporter.start_progress(2, "converting");
        assert!(reporter.progress_bar.is_some());
        reporter.set_message("inbox.svg");
        reporter.increment(2);
        reporter.success("inbox");
        reporter.finish();
        assert!(reporter.progress_bar.is_none());
    }
}
