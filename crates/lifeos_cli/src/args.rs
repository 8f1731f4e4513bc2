//! CLI argument definitions.

use chrono::{Days, NaiveDate};
use clap::{Parser, Subcommand};
use lifeos_core::{TaskPriority, TaskView, FOCUS_LANE_LEN};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "lifeos")]
#[command(about = "Personal task list: capture, rank and clear the day's work")]
#[command(version)]
pub struct Cli {
    /// SQLite file holding the task slot
    #[arg(long, env = "LIFEOS_DB_PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, env = "LIFEOS_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "LIFEOS_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        title: String,
        /// critical|normal|low or 1|2|3
        #[arg(short, long, default_value = "normal")]
        priority: TaskPriority,
        /// YYYY-MM-DD, `today` or `tomorrow`
        #[arg(short, long)]
        due: Option<DueArg>,
        #[arg(long)]
        notes: Option<String>,
        /// Repeat for several tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Flip a task between open and done
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task permanently
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Change title, priority, due date, notes or tags
    Edit {
        /// Task id or unique id prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        priority: Option<TaskPriority>,
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<DueArg>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
        /// Replace all tags; repeat for several
        #[arg(short, long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,
        #[arg(long)]
        clear_tags: bool,
    },

    /// Delete every done task
    ClearDone,

    /// List tasks in ranked order
    List {
        /// open|today|done|all
        #[arg(short, long, default_value = "open")]
        view: TaskView,
    },

    /// Show the top-ranked open tasks
    Focus {
        #[arg(short, long, default_value_t = FOCUS_LANE_LEN)]
        limit: usize,
    },

    /// Open, done and critical-due-today counts
    Summary,

    /// Ask the assistant
    Ask { prompt: String },
}

/// Due date as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueArg {
    Today,
    Tomorrow,
    On(NaiveDate),
}

impl DueArg {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
            Self::On(date) => date,
        }
    }
}

impl FromStr for DueArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(Self::On)
                .map_err(|_| format!("invalid due date `{other}`; expected YYYY-MM-DD")),
        }
    }
}
