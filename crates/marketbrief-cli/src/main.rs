mod cli;
mod error;
mod logging;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use marketbrief_core::PipelineConfig;
use marketbrief_report::{DirectorySink, Pipeline, ReportSink};
use tracing::{info, warn};

use crate::cli::{Cli, Command, RunArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            eprintln!("warning: ignoring .env: {error}");
        }
    }

    match cli.command {
        Command::Run(args) => run_report(args).await,
    }
}

async fn run_report(args: RunArgs) -> Result<ExitCode, CliError> {
    let config = args.apply(PipelineConfig::from_env()?);
    logging::init(&config.log_level);
    if config.fred_api_key.is_none() {
        warn!("no FRED API key configured; indicator series will be reported as unavailable");
    }

    let sink = DirectorySink::new(config.output_dir.clone());
    let report = Pipeline::from_config(config).run().await?;

    // The digest reaches stdout even when the sink cannot be written.
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.digest.as_bytes())?;
    stdout.flush()?;

    let receipt = sink.deliver(&report)?;
    info!(files = receipt.files.len(), partial = report.is_partial(), "run complete");

    if report.is_partial() {
        return Ok(ExitCode::from(3));
    }
    Ok(ExitCode::SUCCESS)
}
