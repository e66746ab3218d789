use super::runs::{run_from_row, RUN_COLUMNS};
use crate::model::{ProfileSlug, RankedScore, RunRow};
use crate::scoring::Breakdown;
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

pub struct StoreStats {
    pub runs: u64,
    pub completed_runs: u64,
    pub scores: u64,
    pub active_items: u64,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(super::schema::DDL)
            .context("apply schema")?;
        Ok(())
    }

    pub fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection mutex poisoned"))
    }

    // --- score store ---

    pub fn ensure_profiles(&self, slugs: &[ProfileSlug]) -> anyhow::Result<super::scores::ProfileIds> {
        let conn = self.lock()?;
        super::scores::ensure_profiles(&conn, slugs)
    }

    pub fn upsert_score(
        &self,
        run_id: i64,
        flashlight_id: i64,
        profile_id: i64,
        score: f64,
        breakdown: &Breakdown,
    ) -> anyhow::Result<()> {
        let json = breakdown.to_json()?;
        let conn = self.lock()?;
        super::scores::upsert_score(&conn, run_id, flashlight_id, profile_id, score, &json)
    }

    pub fn rank_run(&self, run_id: i64) -> anyhow::Result<usize> {
        let conn = self.lock()?;
        super::rank::rank_run(&conn, run_id)
    }

    // --- read side ---

    pub fn get_run(&self, run_id: i64) -> anyhow::Result<Option<RunRow>> {
        let conn = self.lock()?;
        super::runs::get_run(&conn, run_id)
    }

    pub fn list_runs(&self, limit: u32) -> anyhow::Result<Vec<RunRow>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM scoring_runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The canonical source of "current" rankings.
    pub fn latest_completed_run(&self) -> anyhow::Result<Option<RunRow>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM scoring_runs
             WHERE status = 'completed'
             ORDER BY completed_at DESC, id DESC
             LIMIT 1",
            RUN_COLUMNS
        );
        Ok(conn.query_row(&sql, [], run_from_row).optional()?)
    }

    pub fn rankings(
        &self,
        run_id: i64,
        profile: ProfileSlug,
        limit: u32,
        offset: u32,
    ) -> anyhow::Result<Vec<RankedScore>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT fs.rank_position, fs.score, fs.flashlight_id, f.name
             FROM flashlight_scores fs
             JOIN scoring_profiles sp ON sp.id = fs.profile_id
             JOIN flashlights f ON f.id = fs.flashlight_id
             WHERE fs.run_id = ?1 AND sp.slug = ?2
             ORDER BY fs.rank_position ASC, fs.score DESC, fs.flashlight_id ASC
             LIMIT ?3 OFFSET ?4",
        )?;
        let rows = stmt
            .query_map(params![run_id, profile.as_str(), limit, offset], |row| {
                Ok(RankedScore {
                    rank: row.get::<_, Option<i64>>(0)?.unwrap_or(0),
                    score: row.get(1)?,
                    profile,
                    flashlight_id: row.get(2)?,
                    name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_scores(&self, run_id: i64) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        let n = conn.query_row(
            "SELECT COUNT(*) FROM flashlight_scores WHERE run_id = ?1",
            params![run_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }

    pub fn score_breakdown(
        &self,
        run_id: i64,
        flashlight_id: i64,
        profile: ProfileSlug,
    ) -> anyhow::Result<Option<Breakdown>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT fs.metric_breakdown
                 FROM flashlight_scores fs
                 JOIN scoring_profiles sp ON sp.id = fs.profile_id
                 WHERE fs.run_id = ?1 AND fs.flashlight_id = ?2 AND sp.slug = ?3",
                params![run_id, flashlight_id, profile.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(s) => Ok(Some(
                serde_json::from_str(&s).context("decode metric breakdown")?,
            )),
            None => Ok(None),
        }
    }

    pub fn stats_best_effort(&self) -> anyhow::Result<StoreStats> {
        let conn = self.lock()?;
        let count = |sql: &str| -> u64 {
            conn.query_row(sql, [], |r| r.get::<_, i64>(0))
                .map(|n| n.max(0) as u64)
                .unwrap_or(0)
        };
        Ok(StoreStats {
            runs: count("SELECT COUNT(*) FROM scoring_runs"),
            completed_runs: count("SELECT COUNT(*) FROM scoring_runs WHERE status = 'completed'"),
            scores: count("SELECT COUNT(*) FROM flashlight_scores"),
            active_items: count("SELECT COUNT(*) FROM flashlights WHERE is_active = 1"),
        })
    }
}
