use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::{
    db::{Task, TaskDraft, TaskList},
    utils::duration::format_clock,
};

use super::{AppContext, ListArgs, TaskArgs};

pub(crate) fn draft_from_args(args: TaskArgs, defaults: &crate::settings::Settings) -> TaskDraft {
    TaskDraft {
        label: args.label,
        target_intervals: args.intervals.unwrap_or(defaults.default_target_intervals),
        interval_ms: args.duration.unwrap_or(defaults.default_interval_ms),
        tags: args.tags,
    }
}

pub(crate) async fn create(ctx: &AppContext, args: TaskArgs) -> Result<Task> {
    let draft = draft_from_args(args, &ctx.settings.current());
    let task = ctx.db.create_task(draft).await?;
    println!("created task {} \"{}\"", task.id, task.label);
    Ok(task)
}

/// Apply the age window, then the ordering, then the limit.
fn select(tasks: Vec<Task>, args: &ListArgs, now: DateTime<Utc>) -> Vec<Task> {
    let mut tasks: Vec<Task> = match args.duration {
        Some(window_ms) => {
            let window_ms = i64::try_from(window_ms).unwrap_or(i64::MAX);
            tasks
                .into_iter()
                .filter(|task| (now - task.created_at).num_milliseconds() <= window_ms)
                .collect()
        }
        None => tasks,
    };

    if args.sort {
        tasks.sort_by(|a, b| b.id.cmp(&a.id));
    }
    if let Some(limit) = args.limit {
        tasks.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    tasks
}

pub(crate) async fn list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let stored = ctx.db.list_tasks().await?;
    let list = TaskList::from(select(stored.results, &args, Utc::now()));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("count={}", list.count);
    for task in &list.results {
        let finished = ctx.db.count_pomodoros_for_task(task.id).await?;
        println!("{}", describe(task, finished));
    }
    Ok(())
}

pub(crate) async fn delete(ctx: &AppContext, id: i64) -> Result<()> {
    ctx.db.delete_task(id).await?;
    println!("deleted task {id}");
    Ok(())
}

pub(crate) async fn history(ctx: &AppContext, id: i64) -> Result<()> {
    let task = ctx
        .db
        .get_task(id)
        .await?
        .ok_or_else(|| anyhow!("task {id} not found"))?;
    let pomodoros = ctx.db.get_pomodoros_for_task(id).await?;

    println!("{}", describe(&task, pomodoros.len() as u32));
    for (index, pomodoro) in pomodoros.iter().enumerate() {
        println!(
            "  #{} {} -> {} ({})",
            index + 1,
            pomodoro.started_at.format("%Y-%m-%d %H:%M"),
            pomodoro.ended_at.format("%H:%M"),
            format_clock(pomodoro.duration_ms())
        );
    }
    Ok(())
}

fn describe(task: &Task, finished: u32) -> String {
    let tags = if task.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", task.tags.join(","))
    };
    format!(
        "{:>4}  {}/{}  {}  {}{}",
        task.id,
        finished,
        task.target_intervals,
        format_clock(task.interval_ms),
        task.label,
        tags
    )
}
