use super::now_rfc3339;
use crate::model::ProfileSlug;
use anyhow::Context;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

const PROFILE_DESCRIPTION: &str = "Auto-managed by scoring engine batch job.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileIds(BTreeMap<ProfileSlug, i64>);

impl ProfileIds {
    pub fn get(&self, slug: ProfileSlug) -> anyhow::Result<i64> {
        self.0
            .get(&slug)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("profile {} was not initialized", slug))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Inserts missing profiles; an existing slug only has its display name refreshed.
pub fn ensure_profiles(conn: &Connection, slugs: &[ProfileSlug]) -> anyhow::Result<ProfileIds> {
    let mut stmt = conn.prepare(
        "INSERT INTO scoring_profiles (slug, display_name, description, version, is_active)
         VALUES (?1, ?2, ?3, 1, 1)
         ON CONFLICT(slug) DO UPDATE SET display_name = excluded.display_name
         RETURNING id",
    )?;

    let mut out = BTreeMap::new();
    for slug in slugs {
        let id: i64 = stmt
            .query_row(
                params![slug.as_str(), slug.display_name(), PROFILE_DESCRIPTION],
                |r| r.get(0),
            )
            .with_context(|| format!("ensure profile {}", slug))?;
        out.insert(*slug, id);
    }
    Ok(ProfileIds(out))
}

/// Writes one (run, item, profile) score. A repeat call overwrites score, breakdown and
/// timestamp in place.
pub fn upsert_score(
    conn: &Connection,
    run_id: i64,
    flashlight_id: i64,
    profile_id: i64,
    score: f64,
    breakdown_json: &str,
) -> anyhow::Result<()> {
    if !(0.0..=100.0).contains(&score) {
        anyhow::bail!(
            "score {} for flashlight {} is outside 0..=100",
            score,
            flashlight_id
        );
    }
    conn.execute(
        "INSERT INTO flashlight_scores
            (run_id, flashlight_id, profile_id, score, metric_breakdown, generated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(run_id, flashlight_id, profile_id) DO UPDATE SET
            score = excluded.score,
            metric_breakdown = excluded.metric_breakdown,
            generated_at = excluded.generated_at",
        params![
            run_id,
            flashlight_id,
            profile_id,
            score,
            breakdown_json,
            now_rfc3339()
        ],
    )
    .with_context(|| {
        format!(
            "upsert score run={} flashlight={} profile={}",
            run_id, flashlight_id, profile_id
        )
    })?;
    Ok(())
}
