use std::process::ExitCode;

use chrono::Local;
use clap::Parser as _;
use hoodscrap::{cli, info_time, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let start_time = Local::now();
    if let Err(e) = try_main().await {
        tracing::error!(error = %e, "failed");
        return ExitCode::FAILURE;
    }
    info_time!(start_time, "Full program time:");

    ExitCode::SUCCESS
}

async fn try_main() -> hoodscrap::Result<()> {
    logging::init()?;

    let cli = cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    cli::run(cli).await
}
