//! Layered configuration: CLI arguments override `--set` values, which override the
//! configuration file, which overrides the compiled defaults.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_bench_config, build_validate_config};
