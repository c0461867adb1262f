//! Comparar: screenshot comparison for visual regression tests
//!
//! Comparar (Spanish: "to compare") decides whether a freshly captured
//! screenshot is visually equivalent to one of its baselines, within a
//! tolerance, after masking out regions that are allowed to change.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    COMPARAR Pipeline                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Options    │    │ Candidate  │    │ Mask       │            │
//! │   │ (sanitize) │───►│ Resolver   │───►│ bounds +   │            │
//! │   │            │    │ shot~*.png │    │ ignores    │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                   │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Report     │◄───│ Best       │◄───│ Pixel      │            │
//! │   │ + diff PNG │    │ candidate  │    │ Differ     │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Baselines live next to each other as `<name>.png` and
//! `<name>~<label>.png`; the actual image matches if any one of them is
//! close enough.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::cast_precision_loss))]

/// Per-candidate and overall comparison reports
pub mod report;

/// Capture and element geometry capabilities
pub mod capture;

/// PNG decoding and encoding
pub mod codec;

/// Engine-wide configuration
pub mod config;

/// File naming and directory resolution
pub mod paths;

/// Storage backends
pub mod storage;

#[allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
pub mod candidates;

#[allow(
    clippy::cast_precision_loss,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]
pub mod compare;

#[allow(clippy::missing_errors_doc)]
mod engine;

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub mod mask;

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]
pub mod options;

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::suboptimal_flops,
    clippy::many_single_char_names,
    clippy::similar_names
)]
pub mod pixel_diff;

mod result;

pub use candidates::{Candidate, CandidateResolver};
pub use capture::{BoundingBoxResolver, ElementScreenshotCapable, MockBrowser, ScreenshotCapable};
pub use compare::{Comparator, Comparison, DiffArtifact, Intermediate};
pub use config::EngineConfig;
pub use engine::VisualEngine;
pub use mask::{apply_mask, clear_rect, Region};
pub use options::{coerce_bool, CompareOptionsInput, ComparisonOptions, DiffArgsInput};
pub use paths::{DirectoryRole, PathResolver};
pub use pixel_diff::{pixel_diff, DiffArgs, Rgb};
pub use report::{CandidateReport, ComparisonReport};
pub use result::{ComparError, ComparResult};
pub use storage::{AccessMode, FsStorage, MemoryStorage, Storage};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        BoundingBoxResolver, CompareOptionsInput, ComparisonOptions, ComparisonReport,
        ComparError, ComparResult, DiffArgs, EngineConfig, FsStorage, MemoryStorage, Region,
        Storage, VisualEngine,
    };
}
