use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use taskpad_core::settings::{Font, FontSize, Layout, Theme};
use taskpad_core::task::{Category, Priority};
use taskpad_core::views::{FilterMode, SortKey};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "taskpad",
    version,
    about = "Taskpad: personal task manager",
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Data directory (defaults to $TASKPAD_DATA, then ~/.taskpad)
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    Add {
        text: String,

        #[arg(short, long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,

        #[arg(short, long, value_parser = parse_category, default_value = "work")]
        category: Category,

        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,
    },

    /// List tasks, filtered and sorted
    List {
        #[arg(short, long, default_value = "all")]
        filter: FilterMode,

        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long, default_value = "created")]
        sort: SortKey,
    },

    /// Toggle a task's completed flag
    Done { id: u64 },

    /// Replace a task's text
    Edit { id: u64, text: String },

    /// Delete a task
    Delete { id: u64 },

    /// Delete every task
    Clear,

    /// Subtask operations
    Sub {
        #[command(subcommand)]
        command: SubCommand,
    },

    /// Collection statistics
    Stats,

    /// Display preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Toggle dark mode
    Dark,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Add a subtask to a task
    Add { task_id: u64, text: String },

    /// Toggle a subtask's completed flag
    Done { task_id: u64, subtask_id: u64 },

    /// Replace a subtask's text
    Edit {
        task_id: u64,
        subtask_id: u64,
        text: String,
    },

    /// Delete a subtask
    Rm { task_id: u64, subtask_id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the current settings record
    Show,

    /// Update the given fields, preserving the rest
    Set {
        #[arg(long, value_parser = parse_theme)]
        theme: Option<Theme>,

        #[arg(long, value_parser = parse_layout)]
        layout: Option<Layout>,

        #[arg(long, value_parser = parse_font)]
        font: Option<Font>,

        #[arg(long = "font-size", value_parser = parse_font_size)]
        font_size: Option<FontSize>,
    },
}

pub fn parse_priority(s: &str) -> anyhow::Result<Priority> {
    match s.trim().to_ascii_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(anyhow!("unknown priority: {other}")),
    }
}

pub fn parse_category(s: &str) -> anyhow::Result<Category> {
    match s.trim().to_ascii_lowercase().as_str() {
        "work" => Ok(Category::Work),
        "home" => Ok(Category::Home),
        "personal" => Ok(Category::Personal),
        other => Err(anyhow!("unknown category: {other}")),
    }
}

/// Due dates are given as calendar days; midnight UTC marks the deadline.
pub fn parse_due_date(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|err| anyhow!("invalid due date {s:?} (expected YYYY-MM-DD): {err}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid due date: {s}"))?;
    Ok(midnight.and_utc())
}

pub fn parse_theme(s: &str) -> anyhow::Result<Theme> {
    match s.trim().to_ascii_lowercase().as_str() {
        "default" => Ok(Theme::Default),
        "sunset" => Ok(Theme::Sunset),
        "forest" => Ok(Theme::Forest),
        "ocean" => Ok(Theme::Ocean),
        "lavender" => Ok(Theme::Lavender),
        other => Err(anyhow!("unknown theme: {other}")),
    }
}

pub fn parse_layout(s: &str) -> anyhow::Result<Layout> {
    match s.trim().to_ascii_lowercase().as_str() {
        "grid" => Ok(Layout::Grid),
        "list" => Ok(Layout::List),
        "compact" => Ok(Layout::Compact),
        other => Err(anyhow!("unknown layout: {other}")),
    }
}

pub fn parse_font(s: &str) -> anyhow::Result<Font> {
    match s.trim().to_ascii_lowercase().as_str() {
        "system" => Ok(Font::System),
        "vazir" => Ok(Font::Vazir),
        "yekan" => Ok(Font::Yekan),
        "sahel" => Ok(Font::Sahel),
        other => Err(anyhow!("unknown font: {other}")),
    }
}

pub fn parse_font_size(s: &str) -> anyhow::Result<FontSize> {
    match s.trim().to_ascii_lowercase().as_str() {
        "sm" => Ok(FontSize::Sm),
        "md" => Ok(FontSize::Md),
        "lg" => Ok(FontSize::Lg),
        "xl" => Ok(FontSize::Xl),
        other => Err(anyhow!("unknown font size: {other}")),
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
