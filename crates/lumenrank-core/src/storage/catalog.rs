use crate::model::SpecRow;
use anyhow::Context;
use rusqlite::Connection;

/// Snapshot of every active item's specs with its latest USD price.
pub fn load_active_specs(conn: &Connection) -> anyhow::Result<Vec<SpecRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT
                f.id,
                s.max_lumens,
                s.max_candela,
                s.beam_distance_m,
                s.runtime_medium_min,
                s.runtime_high_min,
                s.waterproof_rating,
                s.impact_resistance_m,
                (
                    SELECT p.price
                    FROM flashlight_price_snapshots p
                    WHERE p.flashlight_id = f.id
                      AND p.currency_code = 'USD'
                    ORDER BY p.captured_at DESC, p.id DESC
                    LIMIT 1
                ) AS price_usd
             FROM flashlights f
             JOIN flashlight_specs s ON s.flashlight_id = f.id
             WHERE f.is_active = 1
             ORDER BY f.id",
        )
        .context("prepare spec snapshot")?;

    let rows = stmt.query_map([], |row| {
        Ok(SpecRow {
            flashlight_id: row.get(0)?,
            max_lumens: row.get(1)?,
            max_candela: row.get(2)?,
            beam_distance_m: row.get(3)?,
            runtime_medium_min: row.get(4)?,
            runtime_high_min: row.get(5)?,
            waterproof_rating: row.get(6)?,
            impact_resistance_m: row.get(7)?,
            price_usd: row.get(8)?,
        })
    })?;

    let mut out = Vec::with_capacity(128);
    for r in rows {
        out.push(r.context("read spec row")?);
    }
    Ok(out)
}
