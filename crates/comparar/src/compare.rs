//! Multi-candidate comparison.
//!
//! The actual image is masked once and compared against every candidate in
//! discovery order. The candidate with the fewest differing pixels wins (the
//! earlier one on ties), and only its diff raster is kept.

use crate::candidates::Candidate;
use crate::codec::encode_png;
use crate::mask::apply_mask;
use crate::options::ComparisonOptions;
use crate::paths::diff_file_name;
use crate::pixel_diff::pixel_diff;
use crate::report::{CandidateReport, ComparisonReport};
use crate::result::{ComparError, ComparResult};
use image::RgbaImage;

/// Masked raster handed to an intermediate observer
#[derive(Debug, Clone, Copy)]
pub enum Intermediate<'a> {
    /// The masked actual image
    Actual(&'a RgbaImage),
    /// A masked candidate
    Candidate(&'a Candidate, &'a RgbaImage),
}

/// PNG-encoded diff of the best candidate, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffArtifact {
    /// Name relative to the diff directory
    pub name: String,
    /// Encoded PNG
    pub png: Vec<u8>,
}

/// Result of [`Comparator::compare`]
#[derive(Debug, Clone)]
pub struct Comparison {
    /// The report
    pub report: ComparisonReport,
    /// Diff to persist; present only when the best candidate does not match
    pub diff: Option<DiffArtifact>,
}

/// Compares one actual image against a list of candidates
#[derive(Debug, Clone, Copy)]
pub struct Comparator<'a> {
    options: &'a ComparisonOptions,
    diff_prefix: &'a str,
    save_diff: bool,
}

impl<'a> Comparator<'a> {
    /// Comparator for `options`; diff artifacts are named with `diff_prefix`
    #[must_use]
    pub const fn new(options: &'a ComparisonOptions, diff_prefix: &'a str) -> Self {
        Self {
            options,
            diff_prefix,
            save_diff: true,
        }
    }

    /// Enable or disable diff artifacts
    #[must_use]
    pub const fn with_save_diff(mut self, save_diff: bool) -> Self {
        self.save_diff = save_diff;
        self
    }

    /// Compare `actual` against `candidates`.
    ///
    /// `baseline_name` names the diff artifact. `load` decodes one candidate.
    pub fn compare<F>(
        &self,
        baseline_name: &str,
        actual: RgbaImage,
        candidates: &[Candidate],
        load: F,
    ) -> ComparResult<Comparison>
    where
        F: FnMut(&Candidate) -> ComparResult<RgbaImage>,
    {
        self.compare_observed(baseline_name, actual, candidates, load, |_| Ok(()))
    }

    /// Like [`Comparator::compare`], handing each masked raster to `observe`
    pub fn compare_observed<F, O>(
        &self,
        baseline_name: &str,
        mut actual: RgbaImage,
        candidates: &[Candidate],
        mut load: F,
        mut observe: O,
    ) -> ComparResult<Comparison>
    where
        F: FnMut(&Candidate) -> ComparResult<RgbaImage>,
        O: FnMut(Intermediate<'_>) -> ComparResult<()>,
    {
        if candidates.is_empty() {
            return Err(ComparError::NoBaselineFound {
                name: baseline_name.to_string(),
            });
        }
        let (width, height) = actual.dimensions();
        if height == 0 {
            return Err(ComparError::EmptyActualImage {
                name: baseline_name.to_string(),
            });
        }

        let total = u64::from(width) * u64::from(height);
        let excluded = apply_mask(&mut actual, self.options);
        let relevant = total.saturating_sub(excluded);
        observe(Intermediate::Actual(&actual))?;

        let mut records: Vec<CandidateReport> = Vec::with_capacity(candidates.len());
        let mut best_index = 0;
        let mut snapshot: Option<Vec<u8>> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let mut expected = load(candidate)?;
            if expected.dimensions() != (width, height) {
                return Err(ComparError::DimensionMismatch {
                    candidate: candidate.path.clone(),
                    actual_width: width,
                    actual_height: height,
                    candidate_width: expected.width(),
                    candidate_height: expected.height(),
                });
            }

            apply_mask(&mut expected, self.options);
            observe(Intermediate::Candidate(candidate, &expected))?;

            let (mismatch, diff) = pixel_diff(&expected, &actual, &self.options.diff_args);
            let difference_percent = percent(mismatch, relevant);
            let matches = difference_percent <= self.options.tolerance;
            let diff_artifact = (!matches && self.save_diff).then(|| {
                diff_file_name(self.diff_prefix, baseline_name, &candidate.variation_label)
            });

            tracing::debug!(
                candidate = %candidate.path,
                label = %candidate.variation_label,
                mismatch,
                difference_percent,
                "compared candidate"
            );

            let improved = records
                .get(best_index)
                .map_or(true, |best| mismatch < best.diff_pixel_count);
            if improved {
                best_index = index;
                snapshot = if diff_artifact.is_some() {
                    Some(encode_png(&diff)?)
                } else {
                    None
                };
            }

            records.push(CandidateReport {
                path: candidate.path.clone(),
                variation_label: candidate.variation_label.clone(),
                matches,
                difference_percent,
                diff_artifact,
                diff_pixel_count: mismatch,
                total_pixel_count: total,
                relevant_pixel_count: relevant,
            });
        }

        let best = records[best_index].clone();
        tracing::info!(
            name = %baseline_name,
            candidate = %best.path,
            matches = best.matches,
            difference_percent = best.difference_percent,
            "selected best candidate"
        );

        let diff = match (&best.diff_artifact, snapshot) {
            (Some(name), Some(png)) => Some(DiffArtifact {
                name: name.clone(),
                png,
            }),
            _ => None,
        };

        Ok(Comparison {
            report: ComparisonReport {
                name: baseline_name.to_string(),
                best,
                best_index,
                tolerance: self.options.tolerance,
                candidates: records,
            },
            diff,
        })
    }
}

/// `100 * mismatch / relevant` rounded to 4 decimals; nothing relevant is 0.
fn percent(mismatch: u64, relevant: u64) -> f64 {
    if relevant == 0 {
        return 0.0;
    }
    round4(100.0 * mismatch as f64 / relevant as f64)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
