use clap::Parser;
use tracing::{error, info};

use crate::args::DriverArgs;
use crate::config::{DriverConfig, load_config};
use crate::error::AppResult;
use crate::run::run_scenario;

/// Parses arguments, loads config, and drives one scripted run.
///
/// # Errors
///
/// Returns an error when configuration is missing or invalid, the runtime
/// cannot start, or the token pool cannot be acquired. Failed API calls do
/// not make the run fail.
pub fn run() -> AppResult<()> {
    let args = DriverArgs::parse();

    crate::logger::init_logging(args.verbose);

    let config = load_driver_config(&args).inspect_err(|err| {
        error!("Invalid configuration: {}", err);
    })?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&config))
}

fn load_driver_config(args: &DriverArgs) -> AppResult<DriverConfig> {
    let file = load_config(args.config.as_deref())?;
    let mut config = DriverConfig::from_file(file)?;
    if args.no_color || std::env::var_os("NO_COLOR").is_some() {
        config.run.no_color = true;
    }
    Ok(config)
}

async fn run_async(config: &DriverConfig) -> AppResult<()> {
    let client = config.api_client()?;
    let mut authenticator = config.authenticator()?;

    let stdout = std::io::stdout();
    let report = run_scenario(&config.run, authenticator.as_mut(), &client, stdout.lock()).await?;

    info!(
        session_id = %report.session_id,
        failed = report.errors,
        total = report.total,
        "Session finished"
    );
    Ok(())
}
