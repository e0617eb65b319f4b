use super::Globals;
use crate::cli::BenchArgs;
use crate::config;
use crate::error::Result;
use crate::report::RecordSink;
use mrnabench::{
    core::tables::codon_usage::CodonUsageTable, engine::progress::ProgressReporter, workflows,
};
use tracing::info;

pub async fn run(args: BenchArgs, globals: Globals<'_>) -> Result<()> {
    let app = config::build_bench_config(&args, globals.config_path, globals.set_values)?;

    info!("Loading codon table from {:?}", &app.codon_table);
    let table = CodonUsageTable::load(&app.codon_table)?;
    info!(
        "Engines are installed under {:?}; sweeping lengths {}..={} step {} in {} mode.",
        &app.core_config.bin_root,
        app.plan.min_length,
        app.plan.max_length,
        app.plan.step,
        app.plan.mode
    );

    let progress_handler = globals.progress_handler();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let mut sink = RecordSink::create(app.output.as_deref())?;
    let mut write_error = None;

    let records = tokio::task::block_in_place(|| {
        workflows::benchmark::run(&app.core_config, &table, &app.plan, &reporter, |record| {
            if write_error.is_none() {
                write_error = sink.write(record).err();
            }
        })
    })?;
    if let Some(error) = write_error {
        return Err(error);
    }
    sink.finish()?;

    match &app.output {
        Some(path) => println!(
            "Benchmark complete. {} measurement(s) written to: {}",
            records.len(),
            path.display()
        ),
        None => println!("Benchmark complete. {} measurement(s).", records.len()),
    }
    Ok(())
}
