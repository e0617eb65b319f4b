use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "mrnabench - Benchmark and cross-validate external mRNA sequence design engines.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S engines.derna-lambda=0.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure the time and peak memory of every engine over a sweep of protein lengths.
    Bench(BenchArgs),
    /// Check that the engines agree with each other and with the reference energy model.
    Validate(ValidateArgs),
}

/// Options shared by every command that drives the engines.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Root directory holding the engine installations.
    #[arg(long, value_name = "PATH")]
    pub bin_root: Option<PathBuf>,

    /// Codon frequency table in the GCG CodonFrequency layout.
    #[arg(long, value_name = "PATH")]
    pub codon_table: Option<PathBuf>,
}

/// Arguments for the `bench` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct BenchArgs {
    #[command(flatten)]
    pub install: EngineArgs,

    /// How protein sequences are generated: 'random' or 'mll' (M followed by leucines).
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Stop calling CDSfold and DERNA once one of their runs took longer than this.
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seed for random sequence generation.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Shortest protein length in the sweep.
    #[arg(long, value_name = "INT")]
    pub min_length: Option<usize>,

    /// Longest protein length in the sweep.
    #[arg(long, value_name = "INT")]
    pub max_length: Option<usize>,

    /// Increment between protein lengths.
    #[arg(long, value_name = "INT")]
    pub step: Option<usize>,

    /// Write measurements to a CSV file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub install: EngineArgs,

    /// Length of the random protein sequences.
    #[arg(short, long, value_name = "INT", conflicts_with = "sequence")]
    pub length: Option<usize>,

    /// Number of random sequences to check.
    #[arg(short = 'n', long, value_name = "INT", conflicts_with = "sequence")]
    pub iterations: Option<usize>,

    /// Check a single protein sequence instead of random ones.
    #[arg(long, value_name = "SEQ")]
    pub sequence: Option<String>,

    /// Comma-separated engines to check (default: all).
    /// Example: --engines cdsfold,lineardesign
    #[arg(short, long, value_name = "LIST", value_delimiter = ',')]
    pub engines: Vec<String>,

    /// Absolute tolerance for energy and CAI comparisons.
    #[arg(long, value_name = "FLOAT")]
    pub epsilon: Option<f64>,

    /// Seed for random sequence generation.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Directory holding the ViennaRNA programs (default: search PATH).
    #[arg(long, value_name = "PATH")]
    pub vienna_bin: Option<PathBuf>,
}
