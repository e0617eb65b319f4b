use super::engines::EngineKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_EPSILON: f64 = 1e-3;
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_DERNA_LAMBDA: f64 = 1.0;
pub const DEFAULT_LINEARDESIGN_LAMBDA: f64 = 0.0;
pub const DEFAULT_MRNAFOLD_LAMBDA: f64 = 0.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

/// Directory names of each engine's installation below the binary root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDirs {
    pub cdsfold: String,
    pub derna: String,
    pub lineardesign: String,
    pub mrnafold: String,
}

impl Default for InstallDirs {
    fn default() -> Self {
        Self {
            cdsfold: "CDSfold-main".to_string(),
            derna: "derna-main".to_string(),
            lineardesign: "LinearDesign-main".to_string(),
            mrnafold: "mrnafold-main".to_string(),
        }
    }
}

impl InstallDirs {
    pub fn get(&self, engine: EngineKind) -> &str {
        match engine {
            EngineKind::CdsFold => &self.cdsfold,
            EngineKind::Derna => &self.derna,
            EngineKind::LinearDesign => &self.lineardesign,
            EngineKind::MrnaFold => &self.mrnafold,
        }
    }
}

/// Trade-off weights between MFE and CAI passed to the engines that accept one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambdas {
    pub derna: f64,
    pub lineardesign: f64,
    pub mrnafold: f64,
}

impl Default for Lambdas {
    fn default() -> Self {
        Self {
            derna: DEFAULT_DERNA_LAMBDA,
            lineardesign: DEFAULT_LINEARDESIGN_LAMBDA,
            mrnafold: DEFAULT_MRNAFOLD_LAMBDA,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub bin_root: PathBuf,
    pub install_dirs: InstallDirs,
    pub lambdas: Lambdas,
    pub mrnafold_parallel: bool,
    /// Absolute tolerance for every numeric agreement check.
    pub epsilon: f64,
    pub sample_interval: Duration,
}

impl BenchConfig {
    /// Installation directory of `engine`.
    pub fn install_path(&self, engine: EngineKind) -> PathBuf {
        self.bin_root.join(self.install_dirs.get(engine))
    }
}

#[derive(Default)]
pub struct BenchConfigBuilder {
    bin_root: Option<PathBuf>,
    install_dirs: Option<InstallDirs>,
    lambdas: Option<Lambdas>,
    mrnafold_parallel: Option<bool>,
    epsilon: Option<f64>,
    sample_interval: Option<Duration>,
}

impl BenchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bin_root(mut self, path: PathBuf) -> Self {
        self.bin_root = Some(path);
        self
    }
    pub fn install_dirs(mut self, dirs: InstallDirs) -> Self {
        self.install_dirs = Some(dirs);
        self
    }
    pub fn lambdas(mut self, lambdas: Lambdas) -> Self {
        self.lambdas = Some(lambdas);
        self
    }
    pub fn mrnafold_parallel(mut self, parallel: bool) -> Self {
        self.mrnafold_parallel = Some(parallel);
        self
    }
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }
    pub fn sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = Some(interval);
        self
    }

    pub fn build(self) -> Result<BenchConfig, ConfigError> {
        let bin_root = self
            .bin_root
            .ok_or(ConfigError::MissingParameter("bin_root"))?;

        let epsilon = self.epsilon.unwrap_or(DEFAULT_EPSILON);
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(ConfigError::Invalid {
                parameter: "epsilon",
                reason: format!("must be a positive number, got {epsilon}"),
            });
        }

        let sample_interval = self.sample_interval.unwrap_or(DEFAULT_SAMPLE_INTERVAL);
        if sample_interval.is_zero() {
            return Err(ConfigError::Invalid {
                parameter: "sample_interval",
                reason: "must be greater than zero".to_string(),
            });
        }

        let lambdas = self.lambdas.unwrap_or_default();
        for (parameter, value) in [
            ("lambdas.derna", lambdas.derna),
            ("lambdas.lineardesign", lambdas.lineardesign),
            ("lambdas.mrnafold", lambdas.mrnafold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    parameter,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }

        Ok(BenchConfig {
            bin_root,
            install_dirs: self.install_dirs.unwrap_or_default(),
            lambdas,
            mrnafold_parallel: self.mrnafold_parallel.unwrap_or(true),
            epsilon,
            sample_interval,
        })
    }
}
