use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::{
    db::Database,
    settings::{self, SettingsStore, SETTINGS_FILE},
    utils::duration::parse_duration_ms,
};

mod session;
mod tasks;

#[derive(Debug, Parser)]
#[command(name = "pomo", version, about = "Run tasks through Pomodoro work intervals")]
pub struct Cli {
    /// Data directory holding settings.json and the task database
    /// (defaults to $POMO_HOME, then the platform data directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List stored tasks
    List(ListArgs),
    /// Create a task
    Create(TaskArgs),
    /// Delete a task and its pomodoro history
    Delete { id: i64 },
    /// Show the finished pomodoros of a task
    History { id: i64 },
    /// Run a stored task interactively
    Run { id: i64 },
    /// Create a task and run it right away
    Begin(TaskArgs),
    /// Show settings, or change them when options are given
    Config(ConfigArgs),
}

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Print the list as JSON
    #[arg(long, short)]
    pub json: bool,
    /// Newest tasks first
    #[arg(long, short)]
    pub sort: bool,
    /// Show at most N tasks
    #[arg(long, short = 'n', value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,
    /// Only tasks created within this window, e.g. 24h
    #[arg(long, short, value_parser = duration_arg)]
    pub duration: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Tick cadence of the running timer, e.g. 1s
    #[arg(long, value_parser = duration_arg)]
    pub tick: Option<u64>,
    /// Default interval length for new tasks
    #[arg(long, value_parser = duration_arg)]
    pub interval: Option<u64>,
    /// Default number of intervals for new tasks
    #[arg(long)]
    pub intervals: Option<u32>,
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[arg(long, short)]
    pub label: String,
    /// Number of work intervals
    #[arg(long, short = 'n')]
    pub intervals: Option<u32>,
    /// Length of one interval, e.g. 25m, 90s, 1500ms
    #[arg(long, short, value_parser = duration_arg)]
    pub duration: Option<u64>,
    #[arg(long = "tag", short)]
    pub tags: Vec<String>,
}

fn duration_arg(value: &str) -> Result<u64, String> {
    parse_duration_ms(value).map_err(|err| err.to_string())
}

pub(crate) struct AppContext {
    pub(crate) settings: SettingsStore,
    pub(crate) db: Database,
}

impl AppContext {
    fn open(home: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => settings::data_dir()?,
        };
        let settings = SettingsStore::new(home.join(SETTINGS_FILE))?;
        let db = Database::new(settings.database_path())
            .with_context(|| format!("failed to open task store in {}", home.display()))?;
        Ok(Self { settings, db })
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let ctx = AppContext::open(cli.home)?;

    match cli.command {
        Command::List(args) => tasks::list(&ctx, args).await,
        Command::Create(args) => tasks::create(&ctx, args).await.map(|_| ()),
        Command::Delete { id } => tasks::delete(&ctx, id).await,
        Command::History { id } => tasks::history(&ctx, id).await,
        Command::Run { id } => session::run(&ctx, id).await,
        Command::Begin(args) => {
            let task = tasks::create(&ctx, args).await?;
            session::run(&ctx, task.id).await
        }
        Command::Config(args) => configure(&ctx, args),
    }
}

fn configure(ctx: &AppContext, args: ConfigArgs) -> Result<()> {
    let mut current = ctx.settings.stored();
    let changed = args.tick.is_some() || args.interval.is_some() || args.intervals.is_some();

    if let Some(tick) = args.tick {
        current.tick_interval_ms = tick;
    }
    if let Some(interval) = args.interval {
        current.default_interval_ms = interval;
    }
    if let Some(intervals) = args.intervals {
        if intervals == 0 {
            bail!("default intervals must be at least 1");
        }
        current.default_target_intervals = intervals;
    }

    if changed {
        ctx.settings.update(current.clone())?;
        log::info!("settings written to {}", ctx.settings.path().display());
    }
    println!("{}", serde_json::to_string_pretty(&current)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_with_tags_and_duration() {
        let cli = Cli::try_parse_from([
            "pomo", "create", "--label", "essay", "-n", "3", "--duration", "25m", "--tag", "uni",
            "--tag", "writing",
        ])
        .unwrap();

        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.label, "essay");
                assert_eq!(args.intervals, Some(3));
                assert_eq!(args.duration, Some(1_500_000));
                assert_eq!(args.tags, vec!["uni", "writing"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(Cli::try_parse_from(["pomo", "create", "-l", "x", "-d", "soon"]).is_err());
    }

    #[test]
    fn parses_list_options() {
        let cli = Cli::try_parse_from(["pomo", "list", "-j", "-s", "-n", "2", "-d", "24h"]).unwrap();

        match cli.command {
            Command::List(args) => {
                assert!(args.json);
                assert!(args.sort);
                assert_eq!(args.limit, Some(2));
                assert_eq!(args.duration, Some(86_400_000));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["pomo", "list", "--limit", "0"]).is_err());
    }

    #[test]
    fn home_is_global() {
        let cli = Cli::try_parse_from(["pomo", "run", "4", "--home", "/tmp/p"]).unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/p")));
        assert!(matches!(cli.command, Command::Run { id: 4 }));
    }
}
