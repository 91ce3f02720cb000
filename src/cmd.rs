//! Command implementations for the CLI interface.
//!
//! Commands that touch stored data resolve a `Context` (data directory,
//! current user, messages) and call into the widget modules. `group`,
//! `check-lang` and `completions` never read the config file.

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tracing::debug;

use crate::access::AccessGuard;
use crate::cli::Cli;
use crate::collapse::TaskCollapseToggle;
use crate::config::{self, Config};
use crate::db::{TicketDatabase, TicketService};
use crate::error::{exit_codes, Error, Result};
use crate::fields::{CollapseState, Kind};
use crate::group::{format_date, map_group_to_fields};
use crate::lang::{check_language_file, check_language_text, Messages, BUNDLED_EN_US};
use crate::settings::JsonSettingsStore;
use crate::updates::{self, parse_due_input};
use crate::widget::{move_tasks, widget_rows, Notification};

#[derive(Subcommand)]
pub enum Commands {
    /// Print the filter fields a group maps to, as JSON.
    Group {
        /// Grouping dimension: time | project | priority.
        dimension: String,
        /// Group value, e.g. overdue, thisWeek, later, a project id or a priority.
        value: Option<String>,
    },

    /// Toggle the collapse state of a to-do for the current user.
    Toggle {
        task_id: u64,
    },

    /// Show a to-do and its collapse state.
    Show {
        task_id: u64,
    },

    /// List to-dos in manual order with their time group and collapse state.
    List,

    /// Check whether the current user may update a to-do. Exits 1 when not.
    CanUpdate {
        task_id: u64,
    },

    /// Move to-dos into another group, rewriting the matching field.
    Move {
        /// Grouping dimension: time | project | priority.
        dimension: String,
        /// Target group value.
        value: String,
        #[arg(required = true)]
        task_ids: Vec<u64>,
    },

    /// Rename a to-do.
    Title {
        task_id: u64,
        title: String,
    },

    /// Set the due date of a to-do; an empty value clears it.
    Due {
        task_id: u64,
        /// YYYY-MM-DD, "today", "tomorrow" or "in Nd".
        date: String,
    },

    /// Set the status of a to-do: new, in-progress, waiting, blocked or done.
    Status {
        task_id: u64,
        status: String,
    },

    /// Attach a to-do to a milestone, or detach it when no milestone is given.
    Milestone {
        task_id: u64,
        milestone_id: Option<u64>,
    },

    /// Add a subtask under a to-do.
    Subtask {
        parent_id: u64,
        headline: String,
    },

    /// Save the manual order of to-dos, first id on top.
    Sort {
        #[arg(required = true)]
        task_ids: Vec<u64>,
    },

    /// Add a new to-do.
    Add {
        /// Short headline for the to-do.
        headline: String,
        /// Project id.
        #[arg(long)]
        project: Option<u64>,
        /// Priority 1 (highest) to 4.
        #[arg(long)]
        priority: Option<u8>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow" or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Create a milestone instead of a task.
        #[arg(long)]
        milestone: bool,
    },

    /// Validate a language file (the bundled en-US file by default).
    CheckLang {
        path: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        shell: Shell,
    },
}

/// Resolved locations and identity for one invocation.
pub struct Context {
    pub data_dir: PathBuf,
    pub user: Option<u64>,
    pub language_file: Option<PathBuf>,
}

impl Context {
    /// Merge command-line flags over the config file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let home = config::default_home();
        let config_path = cli.config.clone().unwrap_or_else(|| home.join(config::CONFIG_FILE));
        let cfg = Config::load(&config_path)?;
        let ctx = Context {
            data_dir: cli.data_dir.clone().unwrap_or_else(|| cfg.data_dir_or(&home)),
            user: cli.user.or(cfg.user_id),
            language_file: cli.lang.clone().or(cfg.language_file),
        };
        debug!(data_dir = %ctx.data_dir.display(), user = ?ctx.user, "resolved context");
        Ok(ctx)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(config::SETTINGS_FILE)
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.data_dir.join(config::TICKETS_FILE)
    }

    pub fn require_user(&self) -> Result<u64> {
        self.user.ok_or(Error::NoCurrentUser)
    }

    pub fn messages(&self) -> Result<Messages> {
        match &self.language_file {
            Some(path) => Messages::from_file(path),
            None => Messages::bundled(),
        }
    }
}

/// Run a command; the returned value is the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let ctx = || Context::resolve(&cli);
    match &cli.command {
        Commands::Group { dimension, value } => cmd_group(dimension, value.as_deref()),
        Commands::Toggle { task_id } => cmd_toggle(&ctx()?, *task_id),
        Commands::Show { task_id } => cmd_show(&ctx()?, *task_id),
        Commands::List => cmd_list(&ctx()?),
        Commands::CanUpdate { task_id } => cmd_can_update(&ctx()?, *task_id),
        Commands::Move { dimension, value, task_ids } => cmd_move(&ctx()?, dimension, value, task_ids),
        Commands::Title { task_id, title } => {
            cmd_update(&ctx()?, |db| updates::update_title(db, *task_id, title))
        }
        Commands::Due { task_id, date } => {
            cmd_update(&ctx()?, |db| updates::update_due_date(db, *task_id, date))
        }
        Commands::Status { task_id, status } => {
            cmd_update(&ctx()?, |db| updates::update_status(db, *task_id, status))
        }
        Commands::Milestone { task_id, milestone_id } => {
            cmd_update(&ctx()?, |db| updates::update_milestone(db, *task_id, *milestone_id))
        }
        Commands::Subtask { parent_id, headline } => {
            cmd_update(&ctx()?, |db| updates::add_subtask(db, *parent_id, headline))
        }
        Commands::Sort { task_ids } => cmd_update(&ctx()?, |db| updates::update_sorting(db, task_ids)),
        Commands::Add { headline, project, priority, due, milestone } => {
            let kind = if *milestone { Kind::Milestone } else { Kind::Task };
            cmd_add(&ctx()?, headline.clone(), kind, *project, *priority, due.as_deref())
        }
        Commands::CheckLang { path } => cmd_check_lang(path.clone().or_else(|| cli.lang.clone())),
        Commands::Completions { shell } => {
            cmd_completions(*shell);
            Ok(exit_codes::SUCCESS)
        }
    }
}

pub fn cmd_group(dimension: &str, value: Option<&str>) -> Result<i32> {
    let filter = map_group_to_fields(dimension, value);
    println!("{}", serde_json::to_string(&filter)?);
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_toggle(ctx: &Context, task_id: u64) -> Result<i32> {
    let user = ctx.require_user()?;
    let mut store = JsonSettingsStore::load(&ctx.settings_path())?;
    let state = TaskCollapseToggle::new(&mut store).toggle_task_collapse(task_id, user)?;
    println!("{state}");
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_show(ctx: &Context, task_id: u64) -> Result<i32> {
    let user = ctx.require_user()?;
    let db = TicketDatabase::load(&ctx.tickets_path())?;
    let ticket = db.get_ticket(task_id)?.ok_or(Error::TicketNotFound(task_id))?;
    let mut store = JsonSettingsStore::load(&ctx.settings_path())?;
    let state = TaskCollapseToggle::new(&mut store).collapse_state(task_id, user)?;
    let or_dash = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());

    println!("ID:        {}", ticket.id);
    println!("Headline:  {}", ticket.headline);
    println!("Status:    {}", ticket.status.as_str());
    println!("Project:   {}", or_dash(ticket.project_id));
    println!("Priority:  {}", or_dash(ticket.priority.map(u64::from)));
    println!("Due:       {}", ticket.date_to_finish.map(format_date).unwrap_or_else(|| "-".into()));
    println!("Milestone: {}", or_dash(ticket.milestone_id));
    println!("Parent:    {}", or_dash(ticket.parent_id));
    println!("Collapsed: {}", state == CollapseState::Closed);
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_list(ctx: &Context) -> Result<i32> {
    let db = TicketDatabase::load(&ctx.tickets_path())?;
    let mut store = JsonSettingsStore::load(&ctx.settings_path())?;
    let toggle = TaskCollapseToggle::new(&mut store);
    let rows = widget_rows(db.tickets(), &toggle, ctx.user, Local::now().date_naive())?;

    println!("{:<5} {:<12} {:<9} {:<7} {}", "ID", "Status", "Group", "State", "Headline");
    for row in rows {
        let indent = if row.parent_id.is_some() { "  " } else { "" };
        println!(
            "{:<5} {:<12} {:<9} {:<7} {indent}{}",
            row.id,
            row.status.as_str(),
            row.group,
            row.state.map(CollapseState::as_str).unwrap_or("-"),
            row.headline,
        );
    }
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_can_update(ctx: &Context, task_id: u64) -> Result<i32> {
    let db = TicketDatabase::load(&ctx.tickets_path())?;
    let allowed = AccessGuard::new(&db).can_user_update_task(task_id)?;
    println!("{allowed}");
    Ok(if allowed { exit_codes::SUCCESS } else { exit_codes::NEGATIVE })
}

pub fn cmd_move(ctx: &Context, dimension: &str, value: &str, task_ids: &[u64]) -> Result<i32> {
    cmd_update(ctx, |db| move_tasks(db, task_ids, dimension, Some(value)))
}

/// Run one widget edit against the ticket database and print its localized notification.
///
/// A denied edit prints `notifications.no_access` and exits with `ACCESS_DENIED`;
/// a rejected one exits with `USER_ERROR`.
pub fn cmd_update<N, F>(ctx: &Context, edit: F) -> Result<i32>
where
    N: Notification,
    F: FnOnce(&mut TicketDatabase) -> Result<N>,
{
    let messages = ctx.messages()?;
    let mut db = TicketDatabase::load(&ctx.tickets_path())?;
    match edit(&mut db) {
        Ok(outcome) => {
            println!("{}", messages.lookup(outcome.notification_key()));
            Ok(if outcome.succeeded() { exit_codes::SUCCESS } else { exit_codes::USER_ERROR })
        }
        Err(Error::AccessDenied(id)) => {
            debug!(id, "update denied");
            eprintln!("{}", messages.lookup("notifications.no_access"));
            Ok(exit_codes::ACCESS_DENIED)
        }
        Err(e) => Err(e),
    }
}

pub fn cmd_add(
    ctx: &Context,
    headline: String,
    kind: Kind,
    project: Option<u64>,
    priority: Option<u8>,
    due: Option<&str>,
) -> Result<i32> {
    let due = match due {
        Some(raw) => Some(
            parse_due_input(raw, Local::now().date_naive())
                .ok_or_else(|| Error::InvalidArgument(format!("unrecognised due date '{raw}'")))?,
        ),
        None => None,
    };
    let mut db = TicketDatabase::load(&ctx.tickets_path())?;
    let id = db.add(headline, kind, project, priority, due)?;
    println!("Added to-do {id}");
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_check_lang(path: Option<PathBuf>) -> Result<i32> {
    let doc = match &path {
        Some(p) => check_language_file(p)?,
        None => check_language_text(BUNDLED_EN_US, Path::new("en-US.ini"))?,
    };
    let shown = path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "bundled en-US.ini".into());
    println!("{shown}: {} entries, all notification messages present", doc.len());
    Ok(exit_codes::SUCCESS)
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "mytodos", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::fields::Status;

    fn context(dir: &tempfile::TempDir, user: Option<u64>) -> Context {
        Context { data_dir: dir.path().to_path_buf(), user, language_file: None }
    }

    fn broken_config(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = [unclosed").unwrap();
        path
    }

    #[test]
    fn test_toggle_requires_user() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_toggle(&context(&dir, None), 1).unwrap_err();
        assert!(matches!(err, Error::NoCurrentUser));
    }

    #[test]
    fn test_toggle_persists_between_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, Some(123));
        assert_eq!(cmd_toggle(&ctx, 456).unwrap(), exit_codes::SUCCESS);

        let store = JsonSettingsStore::load(&ctx.settings_path()).unwrap();
        let state = crate::settings::SettingsStore::get_setting(&store, "user.123.taskCollapsed.456", "open");
        assert_eq!(state.unwrap(), "closed");
    }

    #[test]
    fn test_add_move_and_can_update() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, Some(1));
        cmd_add(&ctx, "Ship it".into(), Kind::Task, Some(2), Some(3), Some("2030-01-01")).unwrap();

        assert_eq!(cmd_can_update(&ctx, 1).unwrap(), exit_codes::SUCCESS);
        assert_eq!(cmd_can_update(&ctx, 2).unwrap(), exit_codes::NEGATIVE);

        assert_eq!(cmd_move(&ctx, "priority", "1", &[1]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(cmd_move(&ctx, "priority", "7", &[1]).unwrap(), exit_codes::USER_ERROR);
        assert_eq!(cmd_move(&ctx, "priority", "2", &[1, 2]).unwrap(), exit_codes::USER_ERROR);

        let db = TicketDatabase::load(&ctx.tickets_path()).unwrap();
        assert_eq!(db.get(1).unwrap().priority, Some(2));
    }

    #[test]
    fn test_denied_update_reports_access_denied_once() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, Some(1));
        cmd_add(&ctx, "Ship it".into(), Kind::Task, None, None, None).unwrap();

        let code = cmd_update(&ctx, |db| updates::update_title(db, 2, "x")).unwrap();
        assert_eq!(code, exit_codes::ACCESS_DENIED);
        let code = cmd_update(&ctx, |db| crate::widget::move_task(db, 2, "priority", Some("1"))).unwrap();
        assert_eq!(code, exit_codes::ACCESS_DENIED);
    }

    #[test]
    fn test_update_commands_through_cli() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().display().to_string();
        let config = dir.path().join("absent.toml").display().to_string();
        let run_args = |args: &[&str]| {
            let mut argv = vec!["mytodos", "--data-dir", data.as_str(), "--config", config.as_str()];
            argv.extend_from_slice(args);
            run(Cli::try_parse_from(argv).unwrap())
        };

        assert_eq!(run_args(&["add", "Release", "--milestone"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["add", "Write notes"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["title", "2", "Write release notes"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["due", "2", "2030-02-01"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["status", "2", "blocked"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["status", "2", "sideways"]).unwrap(), exit_codes::USER_ERROR);
        assert_eq!(run_args(&["milestone", "2", "1"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["subtask", "2", "Draft"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["sort", "3", "2"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["sort", "3", "3"]).unwrap(), exit_codes::USER_ERROR);
        assert_eq!(run_args(&["move", "time", "later", "2", "3"]).unwrap(), exit_codes::SUCCESS);
        assert_eq!(run_args(&["list"]).unwrap(), exit_codes::SUCCESS);

        let db = TicketDatabase::load(&dir.path().join(config::TICKETS_FILE)).unwrap();
        let t = db.get(2).unwrap();
        assert_eq!(t.headline, "Write release notes");
        assert_eq!((t.status, t.milestone_id, t.sort_index), (Status::Blocked, Some(1), Some(1)));
        assert_eq!(t.date_to_finish, None);
        assert_eq!(db.get(3).unwrap().parent_id, Some(2));
        assert_eq!(db.get(1).unwrap().kind, Kind::Milestone);
    }

    #[test]
    fn test_group_and_check_lang_ignore_broken_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = broken_config(&dir);
        let config = config.to_str().unwrap();

        let cli = Cli::try_parse_from(["mytodos", "--config", config, "group", "project", "5"]).unwrap();
        assert_eq!(run(cli).unwrap(), exit_codes::SUCCESS);
        let cli = Cli::try_parse_from(["mytodos", "--config", config, "check-lang"]).unwrap();
        assert_eq!(run(cli).unwrap(), exit_codes::SUCCESS);

        let cli = Cli::try_parse_from(["mytodos", "--config", config, "list"]).unwrap();
        assert!(matches!(run(cli), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_add_rejects_bad_due() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_add(&context(&dir, None), "x".into(), Kind::Task, None, None, Some("whenever")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_check_lang_bundled_and_file() {
        assert_eq!(cmd_check_lang(None).unwrap(), exit_codes::SUCCESS);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("de-DE.ini");
        std::fs::write(&path, "notifications.title_updated = \"Titel aktualisiert\"\n").unwrap();
        assert!(matches!(cmd_check_lang(Some(path)), Err(Error::MissingMessages(_))));
    }
}
