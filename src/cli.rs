use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "A terminal to-do board with a live clock", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Clock refresh interval in milliseconds [env: TASKBOARD_TICK_MS, default: 1000]
    #[arg(long, value_name = "MS", global = true)]
    pub tick_ms: Option<u64>,
    /// error, warn, info, debug or trace [env: TASKBOARD_LOG_LEVEL, default: info]
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
    /// Directory for log files [env: TASKBOARD_LOG_DIR, default: ~/.taskboard/logs]
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the board (default)
    Tui,
    /// Print shell completions
    Completions {
        #[arg(value_name = "SHELL", value_enum)]
        shell: Shell,
    },
}
