use anyhow::Context;
use rusqlite::{params, Connection};

/// Dense-ranks every profile partition of one run by score, highest first.
///
/// Ties share a rank and the next distinct score takes the following rank. Rows of
/// other runs are never touched. Returns the number of rows ranked.
pub fn rank_run(conn: &Connection, run_id: i64) -> anyhow::Result<usize> {
    let n = conn
        .execute(
            "WITH ranked AS (
                SELECT
                    run_id,
                    flashlight_id,
                    profile_id,
                    DENSE_RANK() OVER (
                        PARTITION BY run_id, profile_id
                        ORDER BY score DESC
                    ) AS rnk
                FROM flashlight_scores
                WHERE run_id = ?1
            )
            UPDATE flashlight_scores
            SET rank_position = ranked.rnk
            FROM ranked
            WHERE flashlight_scores.run_id = ranked.run_id
              AND flashlight_scores.flashlight_id = ranked.flashlight_id
              AND flashlight_scores.profile_id = ranked.profile_id",
            params![run_id],
        )
        .with_context(|| format!("rank run {}", run_id))?;
    Ok(n)
}
