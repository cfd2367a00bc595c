mod context;
mod history;
mod logging;
mod manage;
mod report;
mod tui;

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;

use crate::context::{today, Context};

#[derive(Parser)]
#[command(name = "timebudget")]
#[command(about = "Weekly time budgets with pace tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage activities (usage: activity add Work Coding budget:10h goal:more)
    Activity {
        #[command(subcommand)]
        action: ActivityAction,
    },
    /// Log time (usage: log Work/Coding 1h30m date:yest note:code review)
    Log {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List the time entries of this week
    Entries {
        /// How many weeks back to look (0 is the current week)
        #[arg(long, default_value_t = 0)]
        week: u32,
    },
    /// Edit or remove a single time entry
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },
    /// Show this week's progress per activity
    Status,
    /// Show finished weeks
    History {
        #[arg(long, default_value_t = 4)]
        weeks: usize,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Open the Terminal User Interface
    Tui,
}

#[derive(clap::Subcommand)]
pub enum CategoryAction {
    Add { name: String },
    Rename { name: String, new_name: String },
    Rm { name: String },
    /// Move a category: up, down, top, bottom or a signed offset
    Mv {
        name: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },
}

#[derive(clap::Subcommand)]
pub enum ActivityAction {
    /// activity add <category> <name> budget:<dur> [goal:more|less|target]
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// activity set <category> <name> [budget:..] [goal:..] [name:..]
    Set {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    Rm { category: String, name: String },
    Mv {
        category: String,
        name: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },
}

#[derive(clap::Subcommand)]
pub enum EntryAction {
    /// entry edit <id> [hours:..] [date:..] [note:..]
    Edit {
        id: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    Rm { id: String },
}

#[derive(clap::Subcommand)]
pub enum ConfigAction {
    Show,
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (store, config) = Context::load_config()?;

    // Without a terminal there is nothing to draw on, so fall back to the report.
    let command = match cli.command {
        Some(command) => command,
        None if std::io::stdout().is_terminal() => Commands::Tui,
        None => Commands::Status,
    };

    if let Commands::Config { action } = command {
        logging::init_stderr(&config.log_level);
        return manage::config(&store, config, action);
    }

    let data_dir = config.resolve_data_dir(store.home());
    if matches!(command, Commands::Tui) {
        logging::init_file(&config.log_level, &data_dir)?;
    } else {
        logging::init_stderr(&config.log_level);
    }

    let ctx = Context::open(&store, config)?;
    ctx.tracking().sync_usage(today())?;

    match command {
        Commands::Category { action } => manage::category(&ctx, action)?,
        Commands::Activity { action } => manage::activity(&ctx, action)?,
        Commands::Log { args } => manage::log(&ctx, &args)?,
        Commands::Entries { week } => report::show_entries(&ctx, week)?,
        Commands::Entry { action } => manage::entry(&ctx, action)?,
        Commands::Status => report::show_status(&ctx)?,
        Commands::History { weeks } => history::show_history(&ctx, weeks)?,
        Commands::Tui => tui::run(&ctx)?,
        Commands::Config { .. } => {}
    }
    Ok(())
}
