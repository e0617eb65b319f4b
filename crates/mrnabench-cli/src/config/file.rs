use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEnginesConfig {
    pub cdsfold_dir: Option<String>,
    pub derna_dir: Option<String>,
    pub lineardesign_dir: Option<String>,
    pub mrnafold_dir: Option<String>,
    pub derna_lambda: Option<f64>,
    pub lineardesign_lambda: Option<f64>,
    pub mrnafold_lambda: Option<f64>,
    pub mrnafold_parallel: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileBenchConfig {
    pub mode: Option<String>,
    pub timeout: Option<u64>,
    pub seed: Option<u64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub step: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileValidateConfig {
    pub length: Option<usize>,
    pub iterations: Option<usize>,
    pub seed: Option<u64>,
    pub engines: Option<Vec<String>>,
    pub vienna_bin: Option<PathBuf>,
}

/// Everything a configuration file may set. Every value is optional; missing values fall
/// back to the compiled defaults.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub bin_root: Option<PathBuf>,
    pub codon_table: Option<PathBuf>,
    pub epsilon: Option<f64>,
    pub sample_interval_ms: Option<u64>,
    pub engines: Option<FileEnginesConfig>,
    pub bench: Option<FileBenchConfig>,
    pub validate: Option<FileValidateConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
