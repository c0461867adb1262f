//! Subcommand handlers.
//!
//! Each handler returns the process exit status on success; errors are
//! mapped to a status by [`CliError::exit_code`].

use crate::commands::{CandidatesArgs, CompareArgs, ConfigArgs};
use crate::config::load_engine_config;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use comparar::{CompareOptionsInput, ComparError, FsStorage, VisualEngine};
use serde_json::{json, Value};
use std::path::Path;

/// Exit status when the images match
pub const EXIT_MATCH: u8 = 0;
/// Exit status when the images differ beyond tolerance
pub const EXIT_MISMATCH: u8 = 1;

/// Merge command-line flags over a JSON options object
pub fn options_input(args: &CompareArgs) -> CliResult<CompareOptionsInput> {
    let mut input = match &args.options {
        Some(text) => CompareOptionsInput::from_json(text)
            .map_err(|e| CliError::invalid_argument(format!("--options: {e}")))?,
        None => CompareOptionsInput::default(),
    };

    if let Some(tolerance) = args.tolerance {
        input.tolerance = Some(json!(tolerance));
    }
    if let Some(threshold) = args.threshold {
        input.diff.threshold = Some(threshold);
    }
    if let Some(region) = args.bounds {
        input.bounding_box = Some(serde_json::to_value(region)?);
    }
    for region in &args.ignore {
        input.ignored_boxes.push(serde_json::to_value(region)?);
    }
    if let Some(other) = &args.compare_with {
        input.compare_with_image = Some(other.clone());
    }
    if args.dump_intermediate {
        input.dump_intermediate = Some(Value::Bool(true));
    }
    if args.update_baseline {
        input.prepare_base_image = Some(Value::Bool(true));
    }
    if args.no_assert {
        input.skip_failure = Some(Value::Bool(true));
    }
    Ok(input)
}

/// `comparador compare`
pub fn run_compare(args: &CompareArgs, cwd: &Path, reporter: &ProgressReporter) -> CliResult<u8> {
    let engine = VisualEngine::new(load_engine_config(&args.dirs, cwd)?, FsStorage::new());
    let options = engine.prepare_options(&options_input(args)?, None)?;
    let format = args.format.into();

    match engine.assert_visual_match(&args.name, &options) {
        Ok(report) => {
            let diff = diff_display(&engine, report.diff_artifact());
            reporter.report(&report, diff.as_deref(), format)?;
            Ok(EXIT_MATCH)
        }
        Err(ComparError::VisualMismatch { report, .. }) => {
            let diff = diff_display(&engine, report.diff_artifact());
            reporter.report(&report, diff.as_deref(), format)?;
            Ok(EXIT_MISMATCH)
        }
        Err(e) => Err(e.into()),
    }
}

fn diff_display(engine: &VisualEngine<FsStorage>, artifact: Option<&str>) -> Option<String> {
    let path = engine.diff_path(artifact?).ok()?;
    Some(path.display().to_string())
}

/// `comparador candidates`
pub fn run_candidates(
    args: &CandidatesArgs,
    cwd: &Path,
    reporter: &ProgressReporter,
) -> CliResult<u8> {
    let engine = VisualEngine::new(load_engine_config(&args.dirs, cwd)?, FsStorage::new());
    let candidates = engine.candidates(&args.name)?;
    reporter.candidates(&args.name, &candidates, args.format.into())?;
    Ok(EXIT_MATCH)
}

/// `comparador config`
pub fn run_config(args: &ConfigArgs, cwd: &Path, reporter: &ProgressReporter) -> CliResult<u8> {
    let config = load_engine_config(&args.dirs, cwd)?;
    reporter.raw(config.to_yaml()?.trim_end())?;
    Ok(EXIT_MATCH)
}
