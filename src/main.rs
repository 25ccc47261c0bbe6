//! Diagnostic pipeline - main entry point

use clap::Parser;
use diagnostic_pipeline::cli::{cmd_run, cmd_schedule, cmd_show_config, cmd_stage, Cli, Commands};
use diagnostic_pipeline::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    match &cli.command {
        Commands::ShowConfig => return cmd_show_config(&config),
        _ => init_logging(Some(&config.paths.log_file))?,
    }

    match &cli.command {
        Commands::Run => cmd_run(&config).await?,
        Commands::Schedule => cmd_schedule(&config).await?,
        command => cmd_stage(&config, command)?,
    }

    Ok(())
}
