//! Baseline candidate discovery.
//!
//! A logical name `shot` accepts the canonical baseline `shot.png` and any
//! number of variants `shot~<label>.png` (dark mode, another font stack, ...).
//! The actual image matches if it is close enough to any one of them.

use crate::paths::{
    ensure_png_extension, join_logical, split_parent, strip_png_extension, VARIANT_SEPARATOR,
};
use crate::result::{ComparError, ComparResult};
use crate::storage::Storage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One acceptable baseline for a logical name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Path relative to the baseline directory, `/`-separated
    pub path: String,
    /// Variation label; empty for the canonical baseline
    pub variation_label: String,
}

impl Candidate {
    /// Whether this is the canonical `<name>.png`
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.variation_label.is_empty()
    }
}

/// Lists the baseline candidates of a logical name
#[derive(Debug)]
pub struct CandidateResolver<'a, S: Storage + ?Sized> {
    storage: &'a S,
    baseline_dir: &'a Path,
}

impl<'a, S: Storage + ?Sized> CandidateResolver<'a, S> {
    /// Resolver over `baseline_dir`
    pub const fn new(storage: &'a S, baseline_dir: &'a Path) -> Self {
        Self {
            storage,
            baseline_dir,
        }
    }

    /// Candidates for `name`, canonical first, then variants by file name.
    ///
    /// `name` may contain `/`-separated directories and may end in `.png`.
    /// Reads the directory on every call.
    pub fn list_candidates(&self, name: &str) -> ComparResult<Vec<Candidate>> {
        let name = ensure_png_extension(name);
        let (parent, file) = split_parent(&name);
        let stem = strip_png_extension(file);
        let pattern = candidate_pattern(stem)?;

        let dir = parent.map_or_else(
            || self.baseline_dir.to_path_buf(),
            |p| join_logical(self.baseline_dir, p),
        );

        let mut candidates: Vec<Candidate> = self
            .storage
            .list_dir(&dir)?
            .into_iter()
            .filter_map(|file_name| {
                let captures = pattern.captures(&file_name)?;
                let variation_label = captures
                    .get(1)
                    .map(|m| m.as_str().trim_start_matches(VARIANT_SEPARATOR).to_string())
                    .unwrap_or_default();
                let path = match parent {
                    Some(p) => format!("{p}/{file_name}"),
                    None => file_name,
                };
                Some(Candidate {
                    path,
                    variation_label,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.is_canonical()
                .cmp(&a.is_canonical())
                .then_with(|| a.path.cmp(&b.path))
        });

        tracing::debug!(name = %name, count = candidates.len(), "resolved baseline candidates");
        Ok(candidates)
    }
}

fn candidate_pattern(stem: &str) -> ComparResult<Regex> {
    let source = format!(
        r"^{}({}.+)?\.png$",
        regex::escape(stem),
        regex::escape(&VARIANT_SEPARATOR.to_string())
    );
    Regex::new(&source).map_err(|e| ComparError::config(format!("Invalid image name {stem}: {e}")))
}
