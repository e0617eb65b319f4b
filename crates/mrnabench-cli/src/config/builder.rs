use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{BenchAppConfig, ValidateAppConfig};
use crate::cli::{BenchArgs, EngineArgs, ValidateArgs};
use crate::error::{CliError, Result};
use mrnabench::core::models::protein::ProteinSequence;
use mrnabench::engine::config::{self as core_config, BenchConfig, BenchConfigBuilder};
use mrnabench::engine::engines::EngineKind;
use mrnabench::workflows::benchmark::{SequenceMode, SweepPlan, UnknownMode};
use mrnabench::workflows::validate::{BatchInput, ValidationRequest};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub fn build_bench_config(
    args: &BenchArgs,
    config_path: Option<&Path>,
    set_values: &[String],
) -> Result<BenchAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(config_path, set_values)?;
    let codon_table = codon_table_path(&args.install, &file_config, &defaults);
    let core_config = build_core_config(&args.install, None, &mut file_config, &defaults)?;

    let bench_file = file_config.bench.take().unwrap_or_default();
    let mode_name = args
        .mode
        .as_deref()
        .or(bench_file.mode.as_deref())
        .unwrap_or(defaults.mode);
    let mode: SequenceMode = mode_name
        .parse()
        .map_err(|e: UnknownMode| CliError::Argument(e.to_string()))?;
    let timeout = args
        .timeout
        .or(bench_file.timeout)
        .unwrap_or(defaults.timeout_seconds);

    let plan = SweepPlan {
        min_length: args
            .min_length
            .or(bench_file.min_length)
            .unwrap_or(defaults.min_length),
        max_length: args
            .max_length
            .or(bench_file.max_length)
            .unwrap_or(defaults.max_length),
        step: args.step.or(bench_file.step).unwrap_or(defaults.step),
        mode,
        timeout: Duration::from_secs(timeout),
        seed: args.seed.or(bench_file.seed).unwrap_or(defaults.seed),
    };

    Ok(BenchAppConfig {
        codon_table,
        output: args.output.clone(),
        plan,
        core_config,
    })
}

pub fn build_validate_config(
    args: &ValidateArgs,
    config_path: Option<&Path>,
    set_values: &[String],
) -> Result<ValidateAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(config_path, set_values)?;
    let codon_table = codon_table_path(&args.install, &file_config, &defaults);
    let core_config =
        build_core_config(&args.install, args.epsilon, &mut file_config, &defaults)?;

    let validate_file = file_config.validate.take().unwrap_or_default();
    let input = match &args.sequence {
        Some(text) => BatchInput::Fixed(text.parse::<ProteinSequence>().map_err(|e| {
            CliError::Argument(format!("Invalid protein sequence '{text}': {e}"))
        })?),
        None => BatchInput::Random {
            length: args
                .length
                .or(validate_file.length)
                .unwrap_or(defaults.validate_length),
            iterations: args
                .iterations
                .or(validate_file.iterations)
                .unwrap_or(defaults.validate_iterations),
        },
    };

    let engine_names = if args.engines.is_empty() {
        validate_file.engines.unwrap_or_default()
    } else {
        args.engines.clone()
    };
    let engines = if engine_names.is_empty() {
        EngineKind::ALL.to_vec()
    } else {
        parse_engines(&engine_names)?
    };

    Ok(ValidateAppConfig {
        codon_table,
        vienna_bin: args.vienna_bin.clone().or(validate_file.vienna_bin),
        request: ValidationRequest {
            engines,
            input,
            seed: args.seed.or(validate_file.seed).unwrap_or(defaults.seed),
        },
        core_config,
    })
}

fn load_file_config(config_path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let file_config = match config_path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, set_values)
}

fn codon_table_path(
    install: &EngineArgs,
    file_config: &FileConfig,
    defaults: &DefaultsConfig,
) -> PathBuf {
    install
        .codon_table
        .clone()
        .or_else(|| file_config.codon_table.clone())
        .unwrap_or_else(|| PathBuf::from(defaults.codon_table))
}

fn build_core_config(
    install: &EngineArgs,
    cli_epsilon: Option<f64>,
    file_config: &mut FileConfig,
    defaults: &DefaultsConfig,
) -> Result<BenchConfig> {
    let engines_file = file_config.engines.take().unwrap_or_default();
    let install_defaults = core_config::InstallDirs::default();
    let lambda_defaults = core_config::Lambdas::default();

    let bin_root = install
        .bin_root
        .clone()
        .or_else(|| file_config.bin_root.clone())
        .unwrap_or_else(|| PathBuf::from(defaults.bin_root));

    let install_dirs = core_config::InstallDirs {
        cdsfold: engines_file.cdsfold_dir.unwrap_or(install_defaults.cdsfold),
        derna: engines_file.derna_dir.unwrap_or(install_defaults.derna),
        lineardesign: engines_file
            .lineardesign_dir
            .unwrap_or(install_defaults.lineardesign),
        mrnafold: engines_file.mrnafold_dir.unwrap_or(install_defaults.mrnafold),
    };
    let lambdas = core_config::Lambdas {
        derna: engines_file.derna_lambda.unwrap_or(lambda_defaults.derna),
        lineardesign: engines_file
            .lineardesign_lambda
            .unwrap_or(lambda_defaults.lineardesign),
        mrnafold: engines_file.mrnafold_lambda.unwrap_or(lambda_defaults.mrnafold),
    };

    let mut builder = BenchConfigBuilder::new()
        .bin_root(bin_root)
        .install_dirs(install_dirs)
        .lambdas(lambdas);
    if let Some(parallel) = engines_file.mrnafold_parallel {
        builder = builder.mrnafold_parallel(parallel);
    }
    if let Some(epsilon) = cli_epsilon.or(file_config.epsilon) {
        builder = builder.epsilon(epsilon);
    }
    if let Some(millis) = file_config.sample_interval_ms {
        builder = builder.sample_interval(Duration::from_millis(millis));
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

fn parse_engines(names: &[String]) -> Result<Vec<EngineKind>> {
    names
        .iter()
        .map(|name| {
            name.parse::<EngineKind>()
                .map_err(|e| CliError::Argument(e.to_string()))
        })
        .collect()
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {key}: '{value}' ({e})")))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "bin-root" => config.bin_root = Some(PathBuf::from(value)),
            "codon-table" => config.codon_table = Some(PathBuf::from(value)),
            "epsilon" => config.epsilon = Some(parse_value(key, value)?),
            "sample-interval-ms" => config.sample_interval_ms = Some(parse_value(key, value)?),
            _ if key.starts_with("engines.") => {
                let engines = config.engines.get_or_insert_with(Default::default);
                match &key["engines.".len()..] {
                    "cdsfold-dir" => engines.cdsfold_dir = Some(value.to_string()),
                    "derna-dir" => engines.derna_dir = Some(value.to_string()),
                    "lineardesign-dir" => engines.lineardesign_dir = Some(value.to_string()),
                    "mrnafold-dir" => engines.mrnafold_dir = Some(value.to_string()),
                    "derna-lambda" => engines.derna_lambda = Some(parse_value(key, value)?),
                    "lineardesign-lambda" => {
                        engines.lineardesign_lambda = Some(parse_value(key, value)?)
                    }
                    "mrnafold-lambda" => engines.mrnafold_lambda = Some(parse_value(key, value)?),
                    "mrnafold-parallel" => {
                        engines.mrnafold_parallel = Some(parse_value(key, value)?)
                    }
                    _ => return Err(unsupported_key(key)),
                }
            }
            _ if key.starts_with("bench.") => {
                let bench = config.bench.get_or_insert_with(Default::default);
                match &key["bench.".len()..] {
                    "mode" => bench.mode = Some(value.to_string()),
                    "timeout" => bench.timeout = Some(parse_value(key, value)?),
                    "seed" => bench.seed = Some(parse_value(key, value)?),
                    "min-length" => bench.min_length = Some(parse_value(key, value)?),
                    "max-length" => bench.max_length = Some(parse_value(key, value)?),
                    "step" => bench.step = Some(parse_value(key, value)?),
                    _ => return Err(unsupported_key(key)),
                }
            }
            _ if key.starts_with("validate.") => {
                let validate = config.validate.get_or_insert_with(Default::default);
                match &key["validate.".len()..] {
                    "length" => validate.length = Some(parse_value(key, value)?),
                    "iterations" => validate.iterations = Some(parse_value(key, value)?),
                    "seed" => validate.seed = Some(parse_value(key, value)?),
                    "engines" => {
                        validate.engines =
                            Some(value.split(',').map(|s| s.trim().to_string()).collect())
                    }
                    "vienna-bin" => validate.vienna_bin = Some(PathBuf::from(value)),
                    _ => return Err(unsupported_key(key)),
                }
            }
            _ => return Err(unsupported_key(key)),
        }
    }
    Ok(config)
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!(
        "Unsupported configuration key for --set: '{}'",
        key
    ))
}
