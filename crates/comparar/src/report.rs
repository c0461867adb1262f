//! Comparison reports.

use serde::{Deserialize, Serialize};

/// Outcome of comparing the actual image with one baseline candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateReport {
    /// Candidate path relative to the baseline directory
    pub path: String,
    /// Variation label; empty for the canonical baseline
    pub variation_label: String,
    /// Whether the difference is within tolerance
    pub matches: bool,
    /// Differing share of relevant pixels, percent, rounded to 4 decimals
    pub difference_percent: f64,
    /// Diff artifact name relative to the diff directory
    pub diff_artifact: Option<String>,
    /// Pixels flagged by the differ
    pub diff_pixel_count: u64,
    /// Width times height
    pub total_pixel_count: u64,
    /// Pixels left after masking
    pub relevant_pixel_count: u64,
}

/// Outcome of a whole comparison.
///
/// Scalar fields are those of the best candidate (fewest differing pixels,
/// earliest on ties); every evaluated candidate is kept in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    /// Logical image name
    pub name: String,
    /// Best candidate
    #[serde(flatten)]
    pub best: CandidateReport,
    /// Index of the best candidate in `candidates`
    pub best_index: usize,
    /// Tolerance the comparison ran with
    pub tolerance: f64,
    /// Every evaluated candidate
    pub candidates: Vec<CandidateReport>,
}

impl ComparisonReport {
    /// Whether the best candidate is within tolerance
    #[must_use]
    pub const fn matches(&self) -> bool {
        self.best.matches
    }

    /// Difference of the best candidate in percent
    #[must_use]
    pub const fn difference_percent(&self) -> f64 {
        self.best.difference_percent
    }

    /// Diff artifact of the best candidate, if one was produced
    #[must_use]
    pub fn diff_artifact(&self) -> Option<&str> {
        self.best.diff_artifact.as_deref()
    }

    /// Variation label of the best candidate
    #[must_use]
    pub fn variation_label(&self) -> &str {
        &self.best.variation_label
    }

    /// Pixels flagged for the best candidate
    #[must_use]
    pub const fn diff_pixel_count(&self) -> u64 {
        self.best.diff_pixel_count
    }

    /// Total pixels of the actual image
    #[must_use]
    pub const fn total_pixel_count(&self) -> u64 {
        self.best.total_pixel_count
    }

    /// Pixels compared after masking
    #[must_use]
    pub const fn relevant_pixel_count(&self) -> u64 {
        self.best.relevant_pixel_count
    }

    /// One-line human summary
    #[must_use]
    pub fn summary(&self) -> String {
        let label = if self.best.variation_label.is_empty() {
            String::new()
        } else {
            format!(" ~{}", self.best.variation_label)
        };
        format!(
            "{}{label}: {:.4}% of {} pixels differ (tolerance {}%)",
            self.name, self.best.difference_percent, self.best.relevant_pixel_count, self.tolerance
        )
    }
}
