use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// MyToDos widget operations from the command line.
/// Data lives in ~/.mytodos unless --data-dir or the config file says otherwise.
#[derive(Parser)]
#[command(name = "mytodos", version, about = "Group, collapse and move to-dos")]
pub struct Cli {
    /// Directory holding settings.json and tickets.json.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Id of the user to act as.
    #[arg(long, global = true, env = "MYTODOS_USER")]
    pub user: Option<u64>,

    /// Language file for notifications.
    #[arg(long, global = true)]
    pub lang: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
