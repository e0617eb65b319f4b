mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod report;
mod utils;

use crate::cli::{Cli, Commands};
use crate::commands::Globals;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

/// Exit status when the engines ran but disagreed.
const EXIT_VALIDATION_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        let code = match e {
            CliError::ValidationFailed { .. } => EXIT_VALIDATION_FAILED,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("mrnabench CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let globals = Globals {
        config_path: cli.config.as_deref(),
        set_values: &cli.set_values,
        quiet: cli.quiet,
    };
    let command_result = match cli.command {
        Commands::Bench(args) => {
            info!("Dispatching to 'bench' command.");
            commands::bench::run(args, globals).await
        }
        Commands::Validate(args) => {
            info!("Dispatching to 'validate' command.");
            commands::validate::run(args, globals).await
        }
    };

    match &command_result {
        Ok(()) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }
    command_result
}
