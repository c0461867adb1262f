//! Per-comparison options and their sanitation.
//!
//! [`CompareOptionsInput`] is the loosely typed boundary (what a test file or
//! the CLI hands over); [`ComparisonOptions`] is what the comparator consumes.
//! Sanitation happens exactly once, in [`ComparisonOptions::from_input`].

use crate::capture::BoundingBoxResolver;
use crate::config::EngineConfig;
use crate::mask::Region;
use crate::pixel_diff::{DiffArgs, Rgb};
use crate::result::{ComparError, ComparResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sanitized options for one comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOptions {
    /// Max percentage of relevant pixels allowed to differ (0.0-100.0)
    pub tolerance: f64,
    /// Baseline name to compare against instead of the actual image's name
    pub compare_with: Option<String>,
    /// Compare only inside this box; all zero disables it
    pub bounding_box: Region,
    /// Regions excluded from comparison
    pub ignore_regions: Vec<Region>,
    /// Pixel differ parameters
    pub diff_args: DiffArgs,
    /// Write masked rasters next to the diff artifacts
    pub dump_intermediate: bool,
    /// Replace the canonical baseline with the actual image before comparing
    pub prepare_base_image: bool,
    /// Let the asserting entry point log a mismatch instead of failing
    pub skip_failure: bool,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            compare_with: None,
            bounding_box: Region::default(),
            ignore_regions: Vec::new(),
            diff_args: DiffArgs::default(),
            dump_intermediate: false,
            prepare_base_image: false,
            skip_failure: false,
        }
    }
}

impl ComparisonOptions {
    /// Options carrying the engine defaults
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            tolerance: sanitize_tolerance(config.tolerance),
            diff_args: config.diff,
            ..Self::default()
        }
    }

    /// Sanitize caller input over the engine defaults.
    ///
    /// An element selector wins over an explicit bounding box and needs a
    /// `resolver`; resolver failures propagate unchanged.
    pub fn from_input(
        input: &CompareOptionsInput,
        config: &EngineConfig,
        resolver: Option<&dyn BoundingBoxResolver>,
    ) -> ComparResult<Self> {
        let tolerance = input
            .tolerance
            .as_ref()
            .and_then(parse_number)
            .unwrap_or(config.tolerance);

        let bounding_box = match (&input.element, &input.bounding_box) {
            (Some(selector), _) => {
                let resolver = resolver.ok_or_else(|| {
                    ComparError::config(format!(
                        "Element {selector} needs a bounding box resolver"
                    ))
                })?;
                resolver.bounding_box(selector)?
            }
            (None, Some(value)) => parse_box(value),
            (None, None) => Region::default(),
        };

        let ignore_regions = input
            .ignored_boxes
            .iter()
            .filter_map(|value| {
                let region = parse_strict_box(value);
                if region.is_none() {
                    tracing::debug!(entry = %value, "dropping malformed ignore region");
                }
                region
            })
            .collect();

        Ok(Self {
            tolerance: sanitize_tolerance(tolerance),
            compare_with: input.compare_with_image.clone().filter(|s| !s.is_empty()),
            bounding_box,
            ignore_regions,
            diff_args: input.diff.merge_over(config.diff),
            dump_intermediate: input.dump_intermediate.as_ref().is_some_and(coerce_bool),
            prepare_base_image: input.prepare_base_image.as_ref().is_some_and(coerce_bool),
            skip_failure: input.skip_failure.as_ref().is_some_and(coerce_bool),
        })
    }

    /// Set the tolerance, clamped into `[0, 100]`
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = sanitize_tolerance(tolerance);
        self
    }

    /// Set the bounding box
    #[must_use]
    pub const fn with_bounding_box(mut self, region: Region) -> Self {
        self.bounding_box = region;
        self
    }

    /// Add an ignore region
    #[must_use]
    pub fn with_ignore_region(mut self, region: Region) -> Self {
        self.ignore_regions.push(region);
        self
    }

    /// Compare against another baseline name
    #[must_use]
    pub fn with_compare_with(mut self, name: impl Into<String>) -> Self {
        self.compare_with = Some(name.into());
        self
    }

    /// Set the differ parameters
    #[must_use]
    pub const fn with_diff_args(mut self, diff_args: DiffArgs) -> Self {
        self.diff_args = diff_args;
        self
    }

    /// Dump masked rasters
    #[must_use]
    pub const fn with_dump_intermediate(mut self, dump: bool) -> Self {
        self.dump_intermediate = dump;
        self
    }

    /// Refresh the baseline from the actual image first
    #[must_use]
    pub const fn with_prepare_base_image(mut self, prepare: bool) -> Self {
        self.prepare_base_image = prepare;
        self
    }

    /// Do not fail the assertion on mismatch
    #[must_use]
    pub const fn with_skip_failure(mut self, skip: bool) -> Self {
        self.skip_failure = skip;
        self
    }
}

/// Raw comparison options as supplied by callers.
///
/// Numeric fields accept numbers or numeric strings; flags go through
/// [`coerce_bool`]. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompareOptionsInput {
    /// Tolerance in percent
    pub tolerance: Option<Value>,
    /// Baseline name override
    pub compare_with_image: Option<String>,
    /// `{left, top, width, height}`
    pub bounding_box: Option<Value>,
    /// Selector whose element box becomes the bounding box
    pub element: Option<String>,
    /// List of `{left, top, width, height}`
    pub ignored_boxes: Vec<Value>,
    /// Differ parameter overrides
    pub diff: DiffArgsInput,
    /// Dump masked rasters
    pub dump_intermediate: Option<Value>,
    /// Refresh the baseline first
    pub prepare_base_image: Option<Value>,
    /// Log instead of failing
    pub skip_failure: Option<Value>,
}

impl CompareOptionsInput {
    /// Parse from JSON text
    pub fn from_json(text: &str) -> ComparResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Optional overrides for [`DiffArgs`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DiffArgsInput {
    /// Matching threshold
    pub threshold: Option<f64>,
    /// Faded-original opacity
    pub alpha: Option<f64>,
    /// Count anti-aliased pixels
    pub include_anti_aliasing: Option<bool>,
    /// Transparent diff background
    pub diff_mask: Option<bool>,
    /// Anti-aliasing color
    pub anti_alias_color: Option<Rgb>,
    /// Difference color
    pub diff_color: Option<Rgb>,
    /// Alternate difference color
    pub diff_color_alt: Option<Rgb>,
}

impl DiffArgsInput {
    /// Overlay the set fields on `defaults`
    #[must_use]
    pub fn merge_over(&self, defaults: DiffArgs) -> DiffArgs {
        DiffArgs {
            threshold: self
                .threshold
                .filter(|t| t.is_finite())
                .map_or(defaults.threshold, |t| t.clamp(0.0, 1.0)),
            alpha: self
                .alpha
                .filter(|a| a.is_finite())
                .map_or(defaults.alpha, |a| a.clamp(0.0, 1.0)),
            include_anti_aliasing: self
                .include_anti_aliasing
                .unwrap_or(defaults.include_anti_aliasing),
            diff_mask: self.diff_mask.unwrap_or(defaults.diff_mask),
            anti_alias_color: self.anti_alias_color.unwrap_or(defaults.anti_alias_color),
            diff_color: self.diff_color.unwrap_or(defaults.diff_color),
            diff_color_alt: self.diff_color_alt.or(defaults.diff_color_alt),
        }
    }
}

/// Interpret a loosely typed flag.
///
/// `true`, non-zero numbers and the strings `true`, `yes`, `on`, `1`
/// (case-insensitive) are true; everything else is false.
#[must_use]
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        _ => false,
    }
}

fn sanitize_tolerance(tolerance: f64) -> f64 {
    if tolerance.is_finite() {
        tolerance.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Non-negative integer pixel coordinate; anything unparseable is 0.
fn parse_dimension(value: Option<&Value>) -> u32 {
    value
        .and_then(parse_number)
        .map_or(0, |n| n.trunc().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Lenient box: each field parsed independently, defaulting to 0.
fn parse_box(value: &Value) -> Region {
    Region::new(
        parse_dimension(value.get("left")),
        parse_dimension(value.get("top")),
        parse_dimension(value.get("width")),
        parse_dimension(value.get("height")),
    )
}

/// Strict box: all four fields must be present and numeric.
fn parse_strict_box(value: &Value) -> Option<Region> {
    let fields = ["left", "top", "width", "height"];
    let complete = fields
        .iter()
        .all(|key| value.get(key).is_some_and(Value::is_number));
    complete.then(|| parse_box(value))
}
