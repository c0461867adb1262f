//! File naming and directory resolution.
//!
//! Logical image names use `/` separators and are relative to a role
//! directory. All names produced here are bit-exact and stable across
//! platforms.

use crate::config::EngineConfig;
use crate::result::{ComparError, ComparResult};
use crate::storage::{AccessMode, Storage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Image file extension
pub const PNG_EXTENSION: &str = ".png";

/// Separator between a baseline name and its variation label
pub const VARIANT_SEPARATOR: char = '~';

/// Which configured directory a file lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryRole {
    /// Baseline images
    Expected,
    /// Captured images
    Actual,
    /// Diff artifacts and intermediate dumps
    Diff,
}

impl fmt::Display for DirectoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Expected => "expected",
            Self::Actual => "actual",
            Self::Diff => "diff",
        };
        f.write_str(name)
    }
}

/// Append `.png` unless the name already ends with it
#[must_use]
pub fn ensure_png_extension(name: &str) -> String {
    if name.ends_with(PNG_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{PNG_EXTENSION}")
    }
}

/// Name without a trailing `.png`
#[must_use]
pub fn strip_png_extension(name: &str) -> &str {
    name.strip_suffix(PNG_EXTENSION).unwrap_or(name)
}

/// Split `a/b/name.png` into (`Some("a/b")`, `name.png`)
#[must_use]
pub fn split_parent(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('/') {
        Some((parent, file)) => (Some(parent), file),
        None => (None, name),
    }
}

/// Diff artifact name for a baseline.
///
/// The final path segment gets `prefix`; a non-empty `label` turns the
/// trailing `.png` into `.<label>.png`:
///
/// ```
/// use comparar::paths::diff_file_name;
///
/// assert_eq!(diff_file_name("Diff_", "shot", ""), "Diff_shot.png");
/// assert_eq!(diff_file_name("Diff_", "sub/shot.png", "alt"), "sub/Diff_shot.alt.png");
/// ```
#[must_use]
pub fn diff_file_name(prefix: &str, baseline: &str, label: &str) -> String {
    let baseline = ensure_png_extension(baseline);
    let (parent, file) = split_parent(&baseline);
    let stem = strip_png_extension(file);
    let file = if label.is_empty() {
        format!("{prefix}{stem}{PNG_EXTENSION}")
    } else {
        format!("{prefix}{stem}.{label}{PNG_EXTENSION}")
    };
    match parent {
        Some(parent) => format!("{parent}/{file}"),
        None => file,
    }
}

/// Name of an intermediate masked dump, e.g. `shot.actual.masked.png`
#[must_use]
pub fn masked_dump_name(name: &str, role: DirectoryRole) -> String {
    let stem = strip_png_extension(name);
    format!("{stem}.{role}.masked{PNG_EXTENSION}")
}

/// Maps (role, file) pairs onto the configured directories
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    expected: Option<PathBuf>,
    actual: Option<PathBuf>,
    diff: Option<PathBuf>,
}

impl PathResolver {
    /// Resolver over the directories of `config`
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            expected: config.baseline_dir.clone(),
            actual: config.actual_dir.clone(),
            diff: config.diff_dir.clone(),
        }
    }

    /// Configured directory for `role`, if any
    #[must_use]
    pub fn directory(&self, role: DirectoryRole) -> Option<&Path> {
        match role {
            DirectoryRole::Expected => self.expected.as_deref(),
            DirectoryRole::Actual => self.actual.as_deref(),
            DirectoryRole::Diff => self.diff.as_deref(),
        }
    }

    /// Configured directory for `role`, or `MissingPathConfiguration`
    pub fn require_directory(&self, role: DirectoryRole, file: &str) -> ComparResult<&Path> {
        self.directory(role)
            .ok_or_else(|| ComparError::MissingPathConfiguration {
                role,
                file: file.to_string(),
            })
    }

    /// Resolve `file` for `role`.
    ///
    /// With a configured directory the file is joined onto it. Without one,
    /// an absolute path to an existing file is accepted as-is.
    pub fn resolve<S: Storage + ?Sized>(
        &self,
        role: DirectoryRole,
        file: &str,
        storage: &S,
    ) -> ComparResult<PathBuf> {
        if let Some(dir) = self.directory(role) {
            return Ok(join_logical(dir, file));
        }
        let path = Path::new(file);
        if path.is_absolute() && storage.exists(path, AccessMode::Read) {
            return Ok(path.to_path_buf());
        }
        Err(ComparError::MissingPathConfiguration {
            role,
            file: file.to_string(),
        })
    }
}

/// Join a `/`-separated logical name onto a directory
#[must_use]
pub fn join_logical(dir: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(dir.to_path_buf(), |path, segment| path.join(segment))
}
