use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{decode_tags, encode_tags, parse_datetime, to_i64, to_u32, to_u64},
    models::{Task, TaskDraft, TaskList},
};

const TASK_COLUMNS: &str =
    "id, label, target_intervals, interval_ms, tags, created_at, updated_at";

fn row_to_task(row: &Row) -> Result<Task> {
    let target_intervals: i64 = row.get("target_intervals")?;
    let interval_ms: i64 = row.get("interval_ms")?;
    let tags: String = row.get("tags")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Task {
        id: row.get("id")?,
        label: row.get("label")?,
        target_intervals: to_u32(target_intervals, "target_intervals")?,
        interval_ms: to_u64(interval_ms, "interval_ms")?,
        tags: decode_tags(&tags)?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    /// Validate and store a new task, returning it with its assigned id.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task> {
        draft.validate()?;
        self.execute(move |conn| {
            let now = Utc::now();
            let label = draft.label.trim().to_string();
            let tags: Vec<String> = draft.tags.iter().map(|tag| tag.trim().to_string()).collect();

            conn.execute(
                "INSERT INTO tasks (label, target_intervals, interval_ms, tags, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    label,
                    draft.target_intervals,
                    to_i64(draft.interval_ms)?,
                    encode_tags(&tags)?,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .context("failed to insert task")?;

            let task_id = conn.last_insert_rowid();
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
            let mut rows = stmt.query(params![task_id])?;
            let task = match rows.next()? {
                Some(row) => row_to_task(row)?,
                None => return Err(anyhow!("task {task_id} not found after insert")),
            };

            Ok(task)
        })
        .await
    }

    pub async fn list_tasks(&self) -> Result<TaskList> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;
            let mut rows = stmt.query([])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }
            Ok(TaskList::from(tasks))
        })
        .await
    }

    pub async fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
            let task = stmt
                .query_row(params![task_id], |row| Ok(row_to_task(row)))
                .optional()?
                .transpose()?;
            Ok(task)
        })
        .await
    }

    /// Delete a task together with its pomodoro history.
    pub async fn delete_task(&self, task_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM pomodoros WHERE task_id = ?1", params![task_id])?;
            let deleted = tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            if deleted == 0 {
                bail!("task {task_id} not found");
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
