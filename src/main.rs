//! # MyToDos
//!
//! Core of the "My To-Dos" dashboard widget of a project-management app, usable
//! from the command line.
//!
//! ## Key Features
//!
//! - **Grouping**: to-dos are grouped by due date (`overdue`, `thisWeek`,
//!   `later`), by project or by priority. A group maps to the ticket fields it
//!   stands for, so moving a to-do between groups rewrites those fields.
//! - **Collapse state**: each user can collapse or expand a to-do; the flag is
//!   kept in a key/value settings store under `user.<id>.taskCollapsed.<task>`.
//! - **Update guard**: a to-do may be updated when the ticket service returns it.
//! - **Inline edits**: title, due date, status, milestone, subtasks and the
//!   manual order, each reported with a localized notification.
//! - **Language check**: notification messages must exist in the language file.
//!
//! ## Quick Start
//!
//! ```bash
//! mytodos add "Write release notes" --project 3 --priority 2 --due tomorrow
//! mytodos group time thisWeek
//! mytodos --user 7 toggle 1
//! mytodos move priority 999 1
//! mytodos status 1 in-progress
//! mytodos check-lang lang/en-US.ini
//! ```
//!
//! Data is stored in `~/.mytodos/` (`tickets.json`, `settings.json`); see
//! `config.toml` in the same directory for overrides. Set `RUST_LOG=debug` to
//! trace store reads and writes.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod access;
pub mod cli;
pub mod cmd;
pub mod collapse;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod group;
pub mod lang;
pub mod settings;
pub mod task;
pub mod updates;
pub mod widget;

use cli::Cli;

fn main() {
    // Tracing is opt-in via RUST_LOG.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    match cmd::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
