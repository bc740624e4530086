use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dayplan", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Schedule document to load (defaults to schedule.json in the store directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub schedule: Option<PathBuf>,

    /// Evaluate as if the local time were DATETIME ("YYYY-MM-DD HH:MM[:SS]")
    #[arg(long, value_name = "DATETIME", global = true)]
    pub at: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show today's tasks with their status
    ///
    /// Example: dayplan today
    Today,
    /// Show the tasks of any weekday
    ///
    /// Example: dayplan day friday
    Day { weekday: String },
    /// Mark one of today's tasks as completed
    ///
    /// Example: dayplan done mon-3
    Done { id: String },
    /// Mark one of today's tasks as not completed
    ///
    /// Example: dayplan undo mon-3
    Undo { id: String },
    /// Flip the completion of one of today's tasks
    ///
    /// Example: dayplan toggle mon-3
    Toggle { id: String },
    /// Clear completions
    ///
    /// Example: dayplan reset today
    /// Example: dayplan reset all
    Reset {
        #[command(subcommand)]
        scope: ResetScope,
    },
    /// Turn task alerts on or off
    ///
    /// Example: dayplan notifications on
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },
    /// Run one notification check (and the midnight rollover check)
    ///
    /// Example: dayplan tick
    Tick,
    /// Run the midnight rollover check only
    ///
    /// Example: dayplan rollover --at "2025-03-11 00:00"
    Rollover,
    /// Show archived completions
    ///
    /// Example: dayplan archive
    /// Example: dayplan archive --date 2025-03-10
    Archive {
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,
    },
    /// Show completion statistics and streaks
    ///
    /// Example: dayplan stats
    Stats,
    /// Keep running, firing alerts and rolling the day over at midnight
    ///
    /// Example: dayplan watch
    /// Example: dayplan watch --at "2025-03-10 23:58" --ticks 180
    Watch {
        /// Stop after N ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Clear completions for today's tasks
    Today,
    /// Clear every completion
    All,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationsAction {
    On,
    Off,
    Status,
}
