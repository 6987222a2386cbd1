//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use wl_core::{Category, Kind};

/// Simple CLI tool to log work and tasks.
///
/// Records start/stop entries for work sessions and named tasks and reports
/// how much of the working day is done.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Commit a new start or stop entry to the log.
    Commit {
        /// Whether the entry belongs to the work session or a task.
        #[arg(value_enum)]
        category: CategoryArg,

        #[arg(value_enum)]
        kind: KindArg,

        /// Task identifier (required for tasks).
        #[arg(long)]
        id: Option<String>,

        /// Offset of the start/stop time in minutes.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset_minutes: i64,

        /// Explicit time, either HH:MM or an ISO 8601 timestamp.
        #[arg(long)]
        time: Option<String>,

        /// Stop running tasks when stopping the session.
        #[arg(short, long)]
        force: bool,
    },

    /// List tasks or report time spent on one.
    #[command(subcommand)]
    Task(TaskAction),

    /// Show the status of today's work.
    Status {
        /// Report on yesterday instead of today.
        #[arg(long)]
        yesterday: bool,

        /// Custom format string, e.g. "{total_time} ({percentage}%)".
        #[arg(long)]
        fmt: Option<String>,
    },

    /// Check the log for inconsistent entries.
    Doctor,

    /// Show the most recent log entries.
    Log {
        /// How many entries to show.
        #[arg(
            short = 'n',
            long,
            default_value_t = 10,
            value_parser = clap::value_parser!(u64).range(1..),
            conflicts_with = "all"
        )]
        number: u64,

        /// Show all entries.
        #[arg(short, long)]
        all: bool,

        /// Only show entries of this category.
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        /// Never use the pager.
        #[arg(long)]
        no_pager: bool,
    },
}

/// Task subcommands.
#[derive(Debug, Subcommand)]
pub enum TaskAction {
    /// List every task identifier ever committed.
    List,

    /// Report time spent on a task, per interval and per day.
    Report {
        /// Task identifier.
        #[arg(long)]
        id: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Session,
    Task,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Session => Self::Session,
            CategoryArg::Task => Self::Task,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Start,
    Stop,
}

impl From<KindArg> for Kind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Start => Self::Start,
            KindArg::Stop => Self::Stop,
        }
    }
}
