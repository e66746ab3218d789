#![allow(dead_code)]

use lumenrank_core::model::SpecRow;
use lumenrank_core::storage::Store;
use rusqlite::{params, Connection};

pub fn reference_spec(id: i64) -> SpecRow {
    SpecRow {
        flashlight_id: id,
        max_lumens: Some(1800.0),
        max_candela: Some(45000.0),
        beam_distance_m: Some(420.0),
        runtime_medium_min: Some(240.0),
        runtime_high_min: Some(95.0),
        waterproof_rating: Some("IP68".into()),
        impact_resistance_m: Some(1.5),
        price_usd: Some(89.99),
    }
}

pub fn seed_item(conn: &Connection, name: &str, spec: &SpecRow) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO flashlights (id, name, is_active) VALUES (?1, ?2, 1)",
        params![spec.flashlight_id, name],
    )?;
    conn.execute(
        "INSERT INTO flashlight_specs
            (flashlight_id, max_lumens, max_candela, beam_distance_m, runtime_medium_min,
             runtime_high_min, waterproof_rating, impact_resistance_m)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            spec.flashlight_id,
            spec.max_lumens,
            spec.max_candela,
            spec.beam_distance_m,
            spec.runtime_medium_min,
            spec.runtime_high_min,
            spec.waterproof_rating,
            spec.impact_resistance_m
        ],
    )?;
    if let Some(price) = spec.price_usd {
        conn.execute(
            "INSERT INTO flashlight_price_snapshots (flashlight_id, price, currency_code, captured_at)
             VALUES (?1, ?2, 'USD', '2026-01-01T00:00:00.000000Z')",
            params![spec.flashlight_id, price],
        )?;
    }
    Ok(())
}

pub fn seeded_store(items: &[(&str, SpecRow)]) -> anyhow::Result<Store> {
    let store = Store::memory()?;
    store.init_schema()?;
    {
        let conn = store.lock()?;
        for (name, spec) in items {
            seed_item(&conn, name, spec)?;
        }
    }
    Ok(store)
}

pub fn count(store: &Store, sql: &str) -> i64 {
    let conn = store.lock().unwrap();
    conn.query_row(sql, [], |r| r.get(0)).unwrap()
}
