//! Comparador: command-line front end for Comparar
//!
//! ```bash
//! comparador compare pages/home --baseline-dir shots/base --actual-dir shots/new
//! comparador compare login --tolerance 0.5 --ignore 0,0,320,40 --format json
//! comparador candidates pages/home --baseline-dir shots/base
//! comparador config --config comparar.yaml
//! ```
//!
//! Exit status: 0 when the images match, 1 when they differ beyond
//! tolerance, 2 when the comparison could not run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    parse_region, CandidatesArgs, Cli, ColorArg, Commands, CompareArgs, ConfigArgs, DirArgs,
    FormatArg, LogFormatArg,
};
pub use config::{load_engine_config, ColorChoice, Verbosity, DEFAULT_CONFIG_FILE};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, ProgressReporter};
