use anyhow::Result;
use clap::Parser;
use log::info;
use menu_reconciler::cli::{Cli, Command};
use menu_reconciler::{logging, orchestrator};

fn main() -> Result<()> {
    logging::init_tracing_from_env();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => {
            let cfg = args.to_app_config()?;
            let summary = orchestrator::run(&cfg)?;
            info!("run complete: {summary}");
        }
        Command::Clean(args) => {
            let cfg = args.to_clean_config()?;
            let total = orchestrator::run_clean_only(&cfg)?;
            info!("clean complete: {total} rows written to {}", cfg.out_dir.display());
        }
    }
    Ok(())
}
