//! Result and error types for Comparar.

use crate::paths::DirectoryRole;
use crate::report::ComparisonReport;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Comparar operations
pub type ComparResult<T> = Result<T, ComparError>;

/// Errors that can occur while preparing or running a comparison.
///
/// Every variant except [`ComparError::VisualMismatch`] means the comparison
/// could not be performed at all. `VisualMismatch` is only produced by the
/// asserting entry point and carries the full report.
#[derive(Debug, Error)]
pub enum ComparError {
    /// No baseline candidate exists for the logical image name
    #[error("No baseline found for {name}")]
    NoBaselineFound {
        /// Logical image name
        name: String,
    },

    /// The actual image decoded to zero rows
    #[error("Actual image {name} is empty")]
    EmptyActualImage {
        /// Logical image name
        name: String,
    },

    /// A baseline candidate has different dimensions than the actual image
    #[error(
        "Image sizes do not match: actual {actual_width}x{actual_height}, \
         baseline {candidate} is {candidate_width}x{candidate_height}"
    )]
    DimensionMismatch {
        /// Candidate identity
        candidate: String,
        /// Actual image width
        actual_width: u32,
        /// Actual image height
        actual_height: u32,
        /// Candidate width
        candidate_width: u32,
        /// Candidate height
        candidate_height: u32,
    },

    /// A directory role has no configured path and the file is not an absolute, existing path
    #[error("No {role} directory configured for {file}")]
    MissingPathConfiguration {
        /// Directory role that was needed
        role: DirectoryRole,
        /// Requested file
        file: String,
    },

    /// Read target does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Missing path
        path: PathBuf,
    },

    /// Write target exists and is not writable
    #[error("File is not writable: {}", path.display())]
    FileNotWritable {
        /// Read-only path
        path: PathBuf,
    },

    /// Element selector matched nothing
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that failed
        selector: String,
    },

    /// Element selector matched more than one element
    #[error("Element {selector} is not unique ({count} matches)")]
    ElementNotUnique {
        /// Selector that failed
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// PNG decode or encode failure
    #[error("Image codec failed: {message}")]
    Codec {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Images differ beyond tolerance (asserting entry point only)
    #[error("{message}")]
    VisualMismatch {
        /// Human-readable failure message
        message: String,
        /// The full comparison report
        report: Box<ComparisonReport>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComparError {
    /// Create a codec error
    #[must_use]
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True when the comparison ran and the images differ.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::VisualMismatch { .. })
    }

    /// The report attached to a mismatch, if any.
    #[must_use]
    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            Self::VisualMismatch { report, .. } => Some(&**report),
            _ => None,
        }
    }
}
