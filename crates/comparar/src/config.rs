//! Engine-wide configuration.
//!
//! Built once, validated once, then only borrowed: every comparison reads its
//! defaults (tolerance, diff parameters, diff file prefix) from here.

use crate::pixel_diff::DiffArgs;
use crate::result::{ComparError, ComparResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default prefix of diff artifact file names
pub const DEFAULT_DIFF_PREFIX: &str = "Diff_";

/// Configuration for the comparison engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory holding baseline (expected) images
    pub baseline_dir: Option<PathBuf>,
    /// Directory holding freshly captured (actual) images
    pub actual_dir: Option<PathBuf>,
    /// Directory receiving diff artifacts
    pub diff_dir: Option<PathBuf>,
    /// Default tolerance, percent of relevant pixels (0.0-100.0)
    pub tolerance: f64,
    /// Prefix of diff artifact file names
    pub diff_prefix: String,
    /// Whether diff artifacts are produced at all
    pub save_diff: bool,
    /// Default pixel differ parameters
    pub diff: DiffArgs,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            baseline_dir: None,
            actual_dir: None,
            diff_dir: None,
            tolerance: 0.0,
            diff_prefix: DEFAULT_DIFF_PREFIX.to_string(),
            save_diff: true,
            diff: DiffArgs::default(),
        }
    }
}

impl EngineConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> ComparResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ComparError::config(format!("Failed to read {}: {e}", path.display()))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml(&text)?,
            Some("json") => serde_json::from_str(&text).map_err(|e| {
                ComparError::config(format!("Invalid JSON in {}: {e}", path.display()))
            })?,
            _ => {
                return Err(ComparError::config(format!(
                    "Unsupported configuration format: {}",
                    path.display()
                )))
            }
        };

        Ok(config.validated())
    }

    /// Parse YAML text
    pub fn from_yaml(text: &str) -> ComparResult<Self> {
        serde_yaml_ng::from_str::<Self>(text)
            .map(Self::validated)
            .map_err(|e| ComparError::config(format!("Invalid YAML: {e}")))
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ComparResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| ComparError::config(e.to_string()))
    }

    /// Clamp numeric settings into range.
    ///
    /// Tolerance lands in `[0, 100]`, threshold and alpha in `[0, 1]`;
    /// non-finite values fall back to the defaults.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = DiffArgs::default();
        self.tolerance = clamp_or(self.tolerance, 0.0, 100.0, 0.0);
        self.diff.threshold = clamp_or(self.diff.threshold, 0.0, 1.0, defaults.threshold);
        self.diff.alpha = clamp_or(self.diff.alpha, 0.0, 1.0, defaults.alpha);
        if self.diff_prefix.contains(['/', '\\']) {
            self.diff_prefix = DEFAULT_DIFF_PREFIX.to_string();
        }
        self
    }

    /// Set the baseline directory
    #[must_use]
    pub fn with_baseline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_dir = Some(dir.into());
        self
    }

    /// Set the actual image directory
    #[must_use]
    pub fn with_actual_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.actual_dir = Some(dir.into());
        self
    }

    /// Set the diff directory
    #[must_use]
    pub fn with_diff_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diff_dir = Some(dir.into());
        self
    }

    /// Set the default tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the diff file prefix
    #[must_use]
    pub fn with_diff_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.diff_prefix = prefix.into();
        self
    }

    /// Enable or disable diff artifacts
    #[must_use]
    pub const fn with_save_diff(mut self, save: bool) -> Self {
        self.save_diff = save;
        self
    }

    /// Set the default differ parameters
    #[must_use]
    pub const fn with_diff_args(mut self, diff: DiffArgs) -> Self {
        self.diff = diff;
        self
    }
}

fn clamp_or(value: f64, lo: f64, hi: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert!(config.baseline_dir.is_none());
        assert!(config.tolerance.abs() < f64::EPSILON);
        assert_eq!(config.diff_prefix, "Diff_");
        assert!(config.save_diff);
        assert!((config.diff.threshold - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_baseline_dir("base")
            .with_actual_dir("out")
            .with_diff_dir("diffs")
            .with_tolerance(2.5)
            .with_diff_prefix("D_")
            .with_save_diff(false);
        assert_eq!(config.baseline_dir, Some(PathBuf::from("base")));
        assert_eq!(config.actual_dir, Some(PathBuf::from("out")));
        assert_eq!(config.diff_dir, Some(PathBuf::from("diffs")));
        assert!((config.tolerance - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.diff_prefix, "D_");
        assert!(!config.save_diff);
    }

    #[test]
    fn test_validated_clamps() {
        let mut config = EngineConfig::new().with_tolerance(-3.0);
        config.diff.threshold = 4.0;
        config.diff.alpha = f64::NAN;
        let config = config.validated();
        assert!(config.tolerance.abs() < f64::EPSILON);
        assert!((config.diff.threshold - 1.0).abs() < f64::EPSILON);
        assert!((config.diff.alpha - 0.1).abs() < f64::EPSILON);

        let config = EngineConfig::new().with_tolerance(250.0).validated();
        assert!((config.tolerance - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prefix_with_separator_is_rejected() {
        let config = EngineConfig::new().with_diff_prefix("../x").validated();
        assert_eq!(config.diff_prefix, DEFAULT_DIFF_PREFIX);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r"
baselineDir: screenshots/base
diffDir: screenshots/diff
tolerance: 1.5
diff:
  threshold: 0.2
  includeAntiAliasing: true
";
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.baseline_dir, Some(PathBuf::from("screenshots/base")));
        assert!(config.actual_dir.is_none());
        assert!((config.tolerance - 1.5).abs() < f64::EPSILON);
        assert!((config.diff.threshold - 0.2).abs() < f64::EPSILON);
        assert!(config.diff.include_anti_aliasing);
        assert_eq!(config.diff_prefix, "Diff_");
    }

    #[test]
    fn test_from_yaml_rejects_unknown_keys() {
        let err = EngineConfig::from_yaml("tolerence: 3\n").unwrap_err();
        assert!(matches!(err, ComparError::Config { .. }));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::new().with_baseline_dir("b").with_tolerance(3.0);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(EngineConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_from_file_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("comparar.json");
        std::fs::write(&json, r#"{"tolerance": 4, "saveDiff": false}"#).unwrap();
        let config = EngineConfig::from_file(&json).unwrap();
        assert!((config.tolerance - 4.0).abs() < f64::EPSILON);
        assert!(!config.save_diff);

        let yaml = dir.path().join("comparar.yml");
        std::fs::write(&yaml, "diffPrefix: Delta_\n").unwrap();
        assert_eq!(EngineConfig::from_file(&yaml).unwrap().diff_prefix, "Delta_");
    }

    #[test]
    fn test_from_file_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparar.toml");
        std::fs::write(&path, "tolerance = 1").unwrap();
        let err = EngineConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = EngineConfig::from_file("/nonexistent/comparar.yaml").unwrap_err();
        assert!(matches!(err, ComparError::Config { .. }));
    }
}
