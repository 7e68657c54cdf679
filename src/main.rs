mod board;
mod cli;
mod clock;
mod config;
mod editor;
mod logging;
mod models;
mod row;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::Config;
use ui::run_tui;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "taskboard", &mut std::io::stdout());
        }
        Some(Commands::Tui) | None => {
            let config = Config::resolve(&cli).context("invalid configuration")?;
            let _logger = logging::init_logging(config.log_level, &config.log_dir)?;
            log::info!("tick interval {:?}", config.tick_interval);
            run_tui(&config)?;
        }
    }

    Ok(())
}
