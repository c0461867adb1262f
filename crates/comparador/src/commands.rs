//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use comparar::Region;
use std::path::PathBuf;

/// Comparador: compare screenshots against their baseline images
#[derive(Parser, Debug)]
#[command(name = "comparador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare an actual image against its baselines
    Compare(CompareArgs),

    /// List the baseline candidates of an image
    Candidates(CandidatesArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Configuration file and directory overrides shared by all subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct DirArgs {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "COMPARAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding baseline images
    #[arg(long)]
    pub baseline_dir: Option<PathBuf>,

    /// Directory holding captured images
    #[arg(long)]
    pub actual_dir: Option<PathBuf>,

    /// Directory receiving diff images
    #[arg(long)]
    pub diff_dir: Option<PathBuf>,
}

/// Arguments for the compare command
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct CompareArgs {
    /// Logical image name, e.g. `pages/home` or `pages/home.png`
    pub name: String,

    #[command(flatten)]
    pub dirs: DirArgs,

    /// Max percentage of differing pixels
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Per-pixel matching threshold (0 to 1)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Compare only inside LEFT,TOP,WIDTH,HEIGHT
    #[arg(long, value_parser = parse_region, value_name = "L,T,W,H")]
    pub bounds: Option<Region>,

    /// Ignore LEFT,TOP,WIDTH,HEIGHT (repeatable)
    #[arg(long, value_parser = parse_region, value_name = "L,T,W,H")]
    pub ignore: Vec<Region>,

    /// Compare against another baseline name
    #[arg(long)]
    pub compare_with: Option<String>,

    /// Comparison options as a JSON object; flags above take precedence
    #[arg(long, value_name = "JSON")]
    pub options: Option<String>,

    /// Write masked rasters into the diff directory
    #[arg(long)]
    pub dump_intermediate: bool,

    /// Copy the actual image over the baseline before comparing
    #[arg(long)]
    pub update_baseline: bool,

    /// Report a mismatch without failing
    #[arg(long)]
    pub no_assert: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the candidates command
#[derive(Args, Debug)]
pub struct CandidatesArgs {
    /// Logical image name
    pub name: String,

    #[command(flatten)]
    pub dirs: DirArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub dirs: DirArgs,
}

/// Output format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color choice argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Plain text lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Parse `L,T,W,H` into a region
pub fn parse_region(value: &str) -> Result<Region, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [left, top, width, height] = *parts.as_slice() else {
        return Err(format!("expected LEFT,TOP,WIDTH,HEIGHT, got {value:?}"));
    };
    let field = |name: &str, raw: &str| {
        raw.parse::<u32>()
            .map_err(|e| format!("invalid {name} {raw:?}: {e}"))
    };
    Ok(Region::new(
        field("left", left)?,
        field("top", top)?,
        field("width", width)?,
        field("height", height)?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_region() {
        assert_eq!(parse_region("1,2,3,4").unwrap(), Region::new(1, 2, 3, 4));
        assert_eq!(parse_region(" 0, 0 ,10,5").unwrap(), Region::new(0, 0, 10, 5));
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,3,-4").is_err());
        assert!(parse_region("a,b,c,d").is_err());
    }

    #[test]
    fn test_parse_compare_command() {
        let cli = Cli::try_parse_from([
            "comparador",
            "-v",
            "compare",
            "pages/home",
            "--baseline-dir",
            "base",
            "--tolerance",
            "1.5",
            "--bounds",
            "0,0,100,50",
            "--ignore",
            "1,1,2,2",
            "--ignore",
            "5,5,2,2",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.name, "pages/home");
        assert_eq!(args.dirs.baseline_dir, Some(PathBuf::from("base")));
        assert_eq!(args.tolerance, Some(1.5));
        assert_eq!(args.bounds, Some(Region::new(0, 0, 100, 50)));
        assert_eq!(args.ignore.len(), 2);
        assert_eq!(args.format, FormatArg::Json);
        assert!(!args.no_assert);
    }

    #[test]
    fn test_parse_candidates_command() {
        let cli = Cli::try_parse_from(["comparador", "candidates", "shot", "--quiet"]).unwrap();
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Candidates(ref a) if a.name == "shot"));
    }

    #[test]
    fn test_global_color_flag() {
        let cli = Cli::try_parse_from(["comparador", "config", "--color", "never"]).unwrap();
        assert_eq!(cli.color, ColorArg::Never);
    }
}
