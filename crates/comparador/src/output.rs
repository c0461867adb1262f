//! Output formatting and result reporting

use comparar::{Candidate, ComparisonReport};
use console::{style, Term};
use serde::{Deserialize, Serialize};
use std::io;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Writes command results to stdout
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Per-candidate detail
    pub verbose: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
            verbose: false,
        }
    }

    /// Show every candidate, not only the best one
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn prefix(&self, symbol: &str, plain: &str, paint: fn(&str) -> String) -> String {
        if self.use_color {
            paint(symbol)
        } else {
            plain.to_string()
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", |s| style(s).green().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // failures are printed even in quiet mode
        let prefix = self.prefix("✗", "FAIL", |s| style(s).red().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", |s| style(s).yellow().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("ℹ", "INFO", |s| style(s).blue().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a raw line (JSON payloads, YAML dumps)
    pub fn raw(&self, text: &str) -> io::Result<()> {
        self.term.write_line(text)
    }

    /// Print a comparison report
    pub fn report(
        &self,
        report: &ComparisonReport,
        diff_path: Option<&str>,
        format: OutputFormat,
    ) -> crate::CliResult<()> {
        if format == OutputFormat::Json {
            self.raw(&serde_json::to_string_pretty(report)?)?;
            return Ok(());
        }

        if report.matches() {
            self.success(&report.summary());
        } else {
            self.failure(&report.summary());
        }

        if self.verbose && !self.quiet {
            for (index, candidate) in report.candidates.iter().enumerate() {
                let marker = if index == report.best_index { "*" } else { " " };
                let _ = self.term.write_line(&format!(
                    "  {marker} {:<40} {:>9.4}%  {} px",
                    candidate.path, candidate.difference_percent, candidate.diff_pixel_count
                ));
            }
        }

        if let Some(path) = diff_path {
            self.info(&format!("diff image: {path}"));
        }
        Ok(())
    }

    /// Print a candidate listing
    pub fn candidates(
        &self,
        name: &str,
        candidates: &[Candidate],
        format: OutputFormat,
    ) -> crate::CliResult<()> {
        if format == OutputFormat::Json {
            self.raw(&serde_json::to_string_pretty(candidates)?)?;
            return Ok(());
        }

        if candidates.is_empty() {
            self.warning(&format!("no baseline found for {name}"));
            return Ok(());
        }
        for candidate in candidates {
            let label = if candidate.is_canonical() {
                "(canonical)".to_string()
            } else {
                format!("~{}", candidate.variation_label)
            };
            self.raw(&format!("{}\t{label}", candidate.path))?;
        }
        Ok(())
    }
}
