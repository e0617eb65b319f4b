use mrnabench::core::tables::codon_usage::CodonTableError;
use mrnabench::workflows::benchmark::BenchmarkError;
use mrnabench::workflows::validate::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to load codon table: {0}")]
    CodonTable(#[from] CodonTableError),

    #[error("{failures} validation failure(s) and {errors} unchecked sequence(s) found")]
    ValidationFailed { failures: usize, errors: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write results: {0}")]
    Report(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
