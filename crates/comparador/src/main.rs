//! Comparador CLI: compare screenshots against baselines
//!
//! ## Usage
//!
//! ```bash
//! comparador compare home --baseline-dir base --actual-dir out --diff-dir diff
//! comparador candidates home --baseline-dir base
//! comparador config
//! ```

use clap::Parser;
use comparador::{
    handlers::{run_candidates, run_compare, run_config},
    logging, Cli, CliResult, ColorChoice, Commands, ProgressReporter, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    logging::init(verbosity, cli.log_format);

    match run(&cli, verbosity) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli, verbosity: Verbosity) -> CliResult<u8> {
    let color: ColorChoice = cli.color.into();
    let reporter = ProgressReporter::new(color.should_color(), verbosity.is_quiet())
        .with_verbose(verbosity.is_verbose());
    let cwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Compare(args) => run_compare(args, &cwd, &reporter),
        Commands::Candidates(args) => run_candidates(args, &cwd, &reporter),
        Commands::Config(args) => run_config(args, &cwd, &reporter),
    }
}
