//! The comparison engine facade.
//!
//! Ties the pieces together: resolves paths, lists candidates, loads rasters
//! through [`Storage`], runs the [`Comparator`] and persists the diff.

use crate::candidates::{Candidate, CandidateResolver};
use crate::capture::{BoundingBoxResolver, ElementScreenshotCapable, ScreenshotCapable};
use crate::codec::{decode_png, encode_png};
use crate::compare::{Comparator, Intermediate};
use crate::config::EngineConfig;
use crate::options::{CompareOptionsInput, ComparisonOptions};
use crate::paths::{ensure_png_extension, join_logical, masked_dump_name, DirectoryRole, PathResolver};
use crate::report::ComparisonReport;
use crate::result::{ComparError, ComparResult};
use crate::storage::Storage;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Visual comparison engine.
///
/// Holds an immutable configuration and a storage backend; `&self` methods
/// may be called from several threads at once.
///
/// # Example
///
/// ```
/// use comparar::{ComparisonOptions, EngineConfig, MemoryStorage, VisualEngine};
/// use comparar::codec::encode_png;
/// use image::{Rgba, RgbaImage};
///
/// let png = encode_png(&RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]))).unwrap();
/// let storage = MemoryStorage::new();
/// storage.insert("/base/home.png", png.clone());
/// storage.insert("/out/home.png", png);
///
/// let config = EngineConfig::new()
///     .with_baseline_dir("/base")
///     .with_actual_dir("/out");
/// let engine = VisualEngine::new(config, storage);
///
/// let report = engine
///     .assert_visual_match("home", &ComparisonOptions::default())
///     .unwrap();
/// assert!(report.matches());
/// ```
#[derive(Debug)]
pub struct VisualEngine<S: Storage> {
    config: EngineConfig,
    paths: PathResolver,
    storage: S,
}

impl<S: Storage> VisualEngine<S> {
    /// Create an engine; the configuration is validated here, once.
    pub fn new(config: EngineConfig, storage: S) -> Self {
        let config = config.validated();
        let paths = PathResolver::new(&config);
        Self {
            config,
            paths,
            storage,
        }
    }

    /// Engine configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Storage backend
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Sanitize caller options over this engine's defaults
    pub fn prepare_options(
        &self,
        input: &CompareOptionsInput,
        resolver: Option<&dyn BoundingBoxResolver>,
    ) -> ComparResult<ComparisonOptions> {
        ComparisonOptions::from_input(input, &self.config, resolver)
    }

    /// Default options of this engine
    #[must_use]
    pub fn default_options(&self) -> ComparisonOptions {
        ComparisonOptions::from_config(&self.config)
    }

    /// Baseline candidates for `name`
    pub fn candidates(&self, name: &str) -> ComparResult<Vec<Candidate>> {
        let file = ensure_png_extension(name);
        let dir = self.paths.require_directory(DirectoryRole::Expected, &file)?;
        CandidateResolver::new(&self.storage, dir).list_candidates(&file)
    }

    /// Path of a diff artifact named in a report
    pub fn diff_path(&self, artifact: &str) -> ComparResult<PathBuf> {
        self.paths.resolve(DirectoryRole::Diff, artifact, &self.storage)
    }

    /// Compare the actual image `name` against its baselines.
    ///
    /// A mismatch is not an error here; inspect [`ComparisonReport::matches`].
    pub fn see_visual_difference(
        &self,
        name: &str,
        options: &ComparisonOptions,
    ) -> ComparResult<ComparisonReport> {
        let file = ensure_png_extension(name);
        let baseline_name = options
            .compare_with
            .as_deref()
            .map_or_else(|| file.clone(), ensure_png_extension);

        let actual_path = self.paths.resolve(DirectoryRole::Actual, &file, &self.storage)?;
        let actual_bytes = self.storage.read(&actual_path)?;

        if options.prepare_base_image {
            self.refresh_baseline(&baseline_name, &actual_bytes)?;
        }

        let candidates = self.candidates(&baseline_name)?;
        if candidates.is_empty() {
            return Err(ComparError::NoBaselineFound {
                name: baseline_name,
            });
        }
        let baseline_dir = self
            .paths
            .require_directory(DirectoryRole::Expected, &baseline_name)?;
        let actual = decode_png(&actual_bytes)?;

        let comparator = Comparator::new(options, &self.config.diff_prefix)
            .with_save_diff(self.diff_output_enabled());
        let load = |candidate: &Candidate| -> ComparResult<RgbaImage> {
            decode_png(&self.storage.read(&join_logical(baseline_dir, &candidate.path))?)
        };

        let outcome = if options.dump_intermediate {
            comparator.compare_observed(&baseline_name, actual, &candidates, load, |step| {
                self.dump_intermediate(&file, step)
            })?
        } else {
            comparator.compare(&baseline_name, actual, &candidates, load)?
        };

        if let Some(diff) = outcome.diff {
            let path = self.diff_path(&diff.name)?;
            self.write_creating_parent(&path, &diff.png)?;
            tracing::info!(path = %path.display(), "wrote diff image");
        }

        Ok(outcome.report)
    }

    /// Compare and fail with [`ComparError::VisualMismatch`] unless it matches.
    ///
    /// With `skip_failure` set the mismatch is logged and the report returned.
    pub fn assert_visual_match(
        &self,
        name: &str,
        options: &ComparisonOptions,
    ) -> ComparResult<ComparisonReport> {
        let report = self.see_visual_difference(name, options)?;
        if report.matches() {
            return Ok(report);
        }

        let mut message = format!(
            "Visual mismatch for {}: {:.4}% difference exceeds tolerance {}%",
            report.name,
            report.difference_percent(),
            report.tolerance
        );
        if let Some(artifact) = report.diff_artifact() {
            let path = self.diff_path(artifact)?;
            message.push_str(&format!("; diff written to {}", path.display()));
        }

        if options.skip_failure {
            tracing::warn!(%message, "visual mismatch ignored");
            return Ok(report);
        }
        Err(ComparError::VisualMismatch {
            message,
            report: Box::new(report),
        })
    }

    /// Capture the page into the actual image `name`; returns its path
    pub fn capture_screenshot(
        &self,
        driver: &impl ScreenshotCapable,
        name: &str,
        full_page: bool,
    ) -> ComparResult<PathBuf> {
        self.capture_via_temp(name, |temp| driver.save_screenshot(temp, full_page))
    }

    /// Capture one element into the actual image `name`; returns its path
    pub fn capture_element(
        &self,
        driver: &impl ElementScreenshotCapable,
        name: &str,
        selector: &str,
    ) -> ComparResult<PathBuf> {
        self.capture_via_temp(name, |temp| driver.save_element_screenshot(selector, temp))
    }

    fn capture_via_temp<F>(&self, name: &str, save: F) -> ComparResult<PathBuf>
    where
        F: FnOnce(&Path) -> ComparResult<()>,
    {
        let file = ensure_png_extension(name);
        let dir = self.paths.require_directory(DirectoryRole::Actual, &file)?;
        let target = join_logical(dir, &file);
        let temp = std::env::temp_dir().join(format!("comparar-{}.png", Uuid::new_v4()));

        let captured = save(&temp).and_then(|()| {
            std::fs::read(&temp).map_err(|_| ComparError::FileNotFound { path: temp.clone() })
        });
        // the driver may have written a partial file before failing
        let _ = std::fs::remove_file(&temp);

        self.write_creating_parent(&target, &captured?)?;
        tracing::debug!(path = %target.display(), "captured actual image");
        Ok(target)
    }

    fn refresh_baseline(&self, baseline_name: &str, actual_bytes: &[u8]) -> ComparResult<()> {
        let dir = self
            .paths
            .require_directory(DirectoryRole::Expected, baseline_name)?;
        let path = join_logical(dir, baseline_name);
        self.write_creating_parent(&path, actual_bytes)?;
        tracing::info!(path = %path.display(), "refreshed baseline from actual image");
        Ok(())
    }

    fn dump_intermediate(&self, file: &str, step: Intermediate<'_>) -> ComparResult<()> {
        let (name, raster) = match step {
            Intermediate::Actual(raster) => (masked_dump_name(file, DirectoryRole::Actual), raster),
            Intermediate::Candidate(candidate, raster) => (
                masked_dump_name(&candidate.path, DirectoryRole::Expected),
                raster,
            ),
        };
        let dir = self.paths.require_directory(DirectoryRole::Diff, &name)?;
        let path = join_logical(dir, &name);
        self.write_creating_parent(&path, &encode_png(raster)?)?;
        tracing::debug!(path = %path.display(), "dumped masked raster");
        Ok(())
    }

    fn write_creating_parent(&self, path: &Path, bytes: &[u8]) -> ComparResult<()> {
        if let Some(parent) = path.parent() {
            self.storage.ensure_dir(parent)?;
        }
        self.storage.write(path, bytes)
    }

    fn diff_output_enabled(&self) -> bool {
        self.config.save_diff && self.config.diff_dir.is_some()
    }
}
