//! stockdna pipeline CLI application.

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use pipeline_config::{build_pipeline_config, load_settings, Overrides};
use pipeline_core::StageStatus;
use pipeline_stages::{Dispatcher, StageRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration errors are fatal before any stage runs
    let settings = load_settings(&cli.config)?;
    logging::setup_logging(
        &settings.logging,
        cli.log_level.map(|level| level.as_str()),
        cli.json_logs,
    );
    let overrides = Overrides {
        train_base_filename: cli.train_base_filename.clone(),
        train_filename: cli.train_filename.clone(),
        start_time: cli.start_time.clone(),
        end_time: cli.end_time.clone(),
    };
    let config = build_pipeline_config(&settings, &overrides)?;

    let dispatcher = Dispatcher::new(StageRegistry::new(&config));

    if cli.menu {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        cli::menu::run(&mut input, &mut output, &dispatcher, &config).await?;
        return Ok(());
    }

    let requested = cli.requested_stages();
    if requested.is_empty() {
        println!("No stages requested. Use stage flags or --menu (see --help).");
        println!("Done!");
        return Ok(());
    }

    let results = dispatcher.run_batch(&requested, &config).await?;

    let mut any_failed = false;
    for (id, result) in &results {
        println!("{}: {} ({})", id, result.status, result.summary);
        if result.status == StageStatus::Failed {
            any_failed = true;
        }
    }
    println!("Done!");

    if any_failed {
        anyhow::bail!("one or more stages failed");
    }
    Ok(())
}
