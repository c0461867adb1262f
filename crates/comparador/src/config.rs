//! CLI configuration

use crate::commands::DirArgs;
use crate::error::CliResult;
use comparar::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "comparar.yaml";

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors and mismatches only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - per-candidate output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Derive from the `-v` count and `-q` flag; quiet wins
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default tracing filter directive for this level
    #[must_use]
    pub const fn log_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Debug => "trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// Build the engine configuration for a command.
///
/// Starts from `--config` (or `comparar.yaml` in `cwd` if present, else the
/// defaults), then applies the directory flags on top.
pub fn load_engine_config(dirs: &DirArgs, cwd: &Path) -> CliResult<EngineConfig> {
    let mut config = match &dirs.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => {
            let fallback = cwd.join(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                tracing::debug!(path = %fallback.display(), "using configuration from working directory");
                EngineConfig::from_file(&fallback)?
            } else {
                EngineConfig::default()
            }
        }
    };

    if let Some(dir) = &dirs.baseline_dir {
        config.baseline_dir = Some(dir.clone());
    }
    if let Some(dir) = &dirs.actual_dir {
        config.actual_dir = Some(dir.clone());
    }
    if let Some(dir) = &dirs.diff_dir {
        config.diff_dir = Some(dir.clone());
    }

    Ok(config.validated())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(3, false), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(2, true), Verbosity::Quiet);
        assert!(Verbosity::Quiet.is_quiet());
        assert!(Verbosity::Debug.is_verbose());
        assert_eq!(Verbosity::Verbose.log_directive(), "debug");
        assert_eq!(Verbosity::Quiet.log_directive(), "warn");
    }

    #[test]
    fn test_color_choice() {
        assert!(ColorChoice::Always.should_color());
        assert!(!ColorChoice::Never.should_color());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.yml");
        std::fs::write(&file, "baselineDir: from-file\ndiffDir: diffs\ntolerance: 2\n").unwrap();

        let dirs = DirArgs {
            config: Some(file),
            baseline_dir: Some(PathBuf::from("from-flag")),
            ..DirArgs::default()
        };
        let config = load_engine_config(&dirs, dir.path()).unwrap();
        assert_eq!(config.baseline_dir, Some(PathBuf::from("from-flag")));
        assert_eq!(config.diff_dir, Some(PathBuf::from("diffs")));
        assert!((config.tolerance - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_file_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "baselineDir: base\n").unwrap();
        let config = load_engine_config(&DirArgs::default(), dir.path()).unwrap();
        assert_eq!(config.baseline_dir, Some(PathBuf::from("base")));
    }

    #[test]
    fn test_no_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_engine_config(&DirArgs::default(), dir.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_broken_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("broken.json");
        std::fs::write(&file, "{").unwrap();
        let dirs = DirArgs {
            config: Some(file),
            ..DirArgs::default()
        };
        let err = load_engine_config(&dirs, dir.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }
}
