use mrnabench::engine::config::BenchConfig;
use mrnabench::workflows::benchmark::SweepPlan;
use mrnabench::workflows::validate::ValidationRequest;
use std::path::PathBuf;

pub struct BenchAppConfig {
    pub codon_table: PathBuf,
    pub output: Option<PathBuf>,
    pub plan: SweepPlan,
    pub core_config: BenchConfig,
}

pub struct ValidateAppConfig {
    pub codon_table: PathBuf,
    pub vienna_bin: Option<PathBuf>,
    pub request: ValidationRequest,
    pub core_config: BenchConfig,
}
