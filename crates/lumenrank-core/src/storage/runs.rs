//! Run lifecycle rows. A run leaves `running` exactly once.

use super::now_rfc3339;
use crate::model::{RunOptions, RunRow, RunStatus};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const MAX_NOTES_CHARS: usize = 2000;

pub fn start_run(conn: &Connection, opts: &RunOptions) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO scoring_runs (run_label, formula_version, status, initiated_by, started_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            opts.run_label,
            opts.formula_version,
            RunStatus::Running.as_str(),
            opts.initiated_by,
            now_rfc3339()
        ],
    )
    .context("insert scoring run")?;
    Ok(conn.last_insert_rowid())
}

pub fn complete_run(conn: &Connection, run_id: i64) -> anyhow::Result<()> {
    finish(conn, run_id, RunStatus::Completed, None)
}

/// Marks the run failed with the error text, truncated to [`MAX_NOTES_CHARS`].
pub fn fail_run(conn: &Connection, run_id: i64, err: &anyhow::Error) -> anyhow::Result<()> {
    let notes = truncate_chars(&format!("error: {:#}", err), MAX_NOTES_CHARS);
    finish(conn, run_id, RunStatus::Failed, Some(&notes))
}

fn finish(
    conn: &Connection,
    run_id: i64,
    status: RunStatus,
    notes: Option<&str>,
) -> anyhow::Result<()> {
    let changed = conn
        .execute(
            "UPDATE scoring_runs
             SET status = ?1, completed_at = ?2, notes = COALESCE(?3, notes)
             WHERE id = ?4 AND status = 'running'",
            params![status.as_str(), now_rfc3339(), notes, run_id],
        )
        .with_context(|| format!("mark run {} {}", run_id, status.as_str()))?;
    if changed != 1 {
        anyhow::bail!(
            "run {} cannot become {}: not found or already terminal",
            run_id,
            status.as_str()
        );
    }
    Ok(())
}

pub(crate) const RUN_COLUMNS: &str =
    "id, run_label, formula_version, status, initiated_by, started_at, completed_at, notes";

pub(crate) fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRow> {
    let status: String = row.get(3)?;
    let status = RunStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown run status {:?}", status).into(),
        )
    })?;
    Ok(RunRow {
        id: row.get(0)?,
        run_label: row.get(1)?,
        formula_version: row.get(2)?,
        status,
        initiated_by: row.get(4)?,
        started_at: row.get(5)?,
        completed_at: row.get(6)?,
        notes: row.get(7)?,
    })
}

pub fn get_run(conn: &Connection, run_id: i64) -> anyhow::Result<Option<RunRow>> {
    let sql = format!("SELECT {} FROM scoring_runs WHERE id = ?1", RUN_COLUMNS);
    Ok(conn
        .query_row(&sql, params![run_id], run_from_row)
        .optional()?)
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
