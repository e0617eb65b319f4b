use super::Globals;
use crate::cli::ValidateArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::report;
use mrnabench::{
    core::tables::codon_usage::CodonUsageTable,
    engine::{process::ProcessRunner, progress::ProgressReporter, vienna::ViennaCli},
    workflows,
};
use tracing::{info, warn};

pub async fn run(args: ValidateArgs, globals: Globals<'_>) -> Result<()> {
    let app = config::build_validate_config(&args, globals.config_path, globals.set_values)?;

    info!("Loading codon table from {:?}", &app.codon_table);
    let table = CodonUsageTable::load(&app.codon_table)?;
    let reference = ViennaCli::new(
        app.vienna_bin.clone(),
        ProcessRunner::new(app.core_config.sample_interval),
    );

    let progress_handler = globals.progress_handler();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Cross-validating {} engine(s)...", app.request.engines.len());
    let report = tokio::task::block_in_place(|| {
        workflows::validate::run(
            &app.core_config,
            &table,
            &reference,
            &app.request,
            &reporter,
        )
    })?;

    report::print_validation_report(&report, &mut std::io::stdout().lock())?;
    if report.is_clean() {
        println!("✓ All engines agree within ε = {}.", app.core_config.epsilon);
        Ok(())
    } else {
        warn!(
            "Validation found {} failure(s) and {} error(s).",
            report.failures.len(),
            report.errors.len()
        );
        Err(CliError::ValidationFailed {
            failures: report.failures.len(),
            errors: report.errors.len(),
        })
    }
}
