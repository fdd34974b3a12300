use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::Pomodoro};

fn row_to_pomodoro(row: &Row) -> Result<Pomodoro> {
    let started_at: String = row.get("started_at")?;
    let ended_at: String = row.get("ended_at")?;

    Ok(Pomodoro {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_datetime(&ended_at, "ended_at")?,
    })
}

impl Database {
    pub async fn insert_pomodoro(&self, pomodoro: &Pomodoro) -> Result<()> {
        let record = pomodoro.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO pomodoros (id, task_id, started_at, ended_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    record.task_id,
                    record.started_at.to_rfc3339(),
                    record.ended_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert pomodoro for task {}", record.task_id))?;
            Ok(())
        })
        .await
    }

    pub async fn get_pomodoros_for_task(&self, task_id: i64) -> Result<Vec<Pomodoro>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, started_at, ended_at
                 FROM pomodoros
                 WHERE task_id = ?1
                 ORDER BY started_at ASC",
            )?;

            let mut rows = stmt.query(params![task_id])?;
            let mut pomodoros = Vec::new();
            while let Some(row) = rows.next()? {
                pomodoros.push(row_to_pomodoro(row)?);
            }
            Ok(pomodoros)
        })
        .await
    }

    pub async fn count_pomodoros_for_task(&self, task_id: i64) -> Result<u32> {
        self.execute(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM pomodoros WHERE task_id = ?1",
                params![task_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
    }
}
