mod common;

use common::{reference_spec, seed_item};
use lumenrank_core::engine::{CancelToken, Engine};
use lumenrank_core::model::{ProfileSlug, RunOptions, RunStatus};
use lumenrank_core::storage::Store;
use tempfile::tempdir;

#[test]
fn test_single_item_batch_lifecycle() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("scores.db");

    // 1. Open store and seed the catalog boundary
    let store = Store::open(&db_path)?;
    store.init_schema()?;
    seed_item(&*store.lock()?, "Reference Thrower", &reference_spec(1))?;

    // 2. Run one batch with explicit options
    let engine = Engine::new(store.clone());
    let summary = engine
        .run_batch(
            RunOptions {
                run_label: "smoke".into(),
                formula_version: "v1".into(),
                initiated_by: "test".into(),
            },
            &CancelToken::new(),
        )
        .map_err(|f| f.error)?;
    assert_eq!(summary.items, 1);
    assert_eq!(summary.scores_written, 5);
    assert_eq!(summary.ranked, 5);

    // 3. Verify through a raw connection
    let conn = rusqlite::Connection::open(&db_path)?;
    let (status, label, completed_at): (String, String, Option<String>) = conn.query_row(
        "SELECT status, run_label, completed_at FROM scoring_runs WHERE id = ?1",
        [summary.run_id],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )?;
    assert_eq!(status, "completed");
    assert_eq!(label, "smoke");
    assert!(completed_at.is_some());

    let mut stmt = conn.prepare(
        "SELECT score, rank_position, metric_breakdown FROM flashlight_scores
         WHERE run_id = ?1 AND flashlight_id = 1",
    )?;
    let rows = stmt
        .query_map([summary.run_id], |r| {
            Ok((
                r.get::<_, f64>(0)?,
                r.get::<_, Option<i64>>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 5);
    for (score, rank, breakdown) in rows {
        assert!(score > 0.0 && score <= 100.0, "score {score}");
        assert_eq!(rank, Some(1));
        let json: serde_json::Value = serde_json::from_str(&breakdown)?;
        assert_eq!(json["formula_version"], "v1");
    }

    let profiles: i64 = conn.query_row("SELECT COUNT(*) FROM scoring_profiles", [], |r| r.get(0))?;
    assert_eq!(profiles, 5);

    Ok(())
}

#[test]
fn test_defaults_and_current_run_lookup() -> anyhow::Result<()> {
    let store = common::seeded_store(&[("Reference", reference_spec(1))])?;
    let engine = Engine::new(store.clone());

    let first = engine
        .run_batch(RunOptions::default(), &CancelToken::new())
        .map_err(|f| f.error)?;
    let second = engine
        .run_batch(RunOptions::default(), &CancelToken::new())
        .map_err(|f| f.error)?;
    assert!(second.run_id > first.run_id);

    let run = store.get_run(first.run_id)?.expect("run row");
    assert!(run.run_label.starts_with("batch-"));
    assert_eq!(run.formula_version, "v1");
    assert_eq!(run.initiated_by, "scorejob");
    assert_eq!(run.status, RunStatus::Completed);

    let current = store.latest_completed_run()?.expect("completed run");
    assert_eq!(current.id, second.run_id);

    // history stays queryable by run id
    assert_eq!(store.count_scores(first.run_id)?, 5);
    assert_eq!(store.count_scores(second.run_id)?, 5);

    let breakdown = store
        .score_breakdown(second.run_id, 1, ProfileSlug::Tactical)?
        .expect("breakdown");
    assert!(breakdown.weighted["tactical"].contains_key("throw"));
    assert_eq!(breakdown.raw["price_usd"], 89.99);
    Ok(())
}

#[test]
fn test_unknown_formula_version_is_recorded_but_scored_with_default_bounds() -> anyhow::Result<()> {
    let store = common::seeded_store(&[("Reference", reference_spec(1))])?;
    let engine = Engine::new(store.clone());

    let v1 = engine
        .run_batch(RunOptions::default(), &CancelToken::new())
        .map_err(|f| f.error)?;
    let v9 = engine
        .run_batch(
            RunOptions {
                formula_version: "v9".into(),
                ..Default::default()
            },
            &CancelToken::new(),
        )
        .map_err(|f| f.error)?;

    assert_eq!(store.get_run(v9.run_id)?.unwrap().formula_version, "v9");
    let a = store.score_breakdown(v1.run_id, 1, ProfileSlug::Throw)?.unwrap();
    let b = store.score_breakdown(v9.run_id, 1, ProfileSlug::Throw)?.unwrap();
    assert_eq!(b.formula_version, "v9");
    assert_eq!(a.normalized, b.normalized);
    Ok(())
}

#[test]
fn test_inactive_items_and_missing_specs_are_skipped() -> anyhow::Result<()> {
    let store = common::seeded_store(&[
        ("Active", reference_spec(1)),
        ("Retired", reference_spec(2)),
    ])?;
    {
        let conn = store.lock()?;
        conn.execute("UPDATE flashlights SET is_active = 0 WHERE id = 2", [])?;
        // active but without a spec row
        conn.execute("INSERT INTO flashlights (id, name) VALUES (3, 'No Specs')", [])?;
    }

    let summary = Engine::new(store.clone())
        .run_batch(RunOptions::default(), &CancelToken::new())
        .map_err(|f| f.error)?;
    assert_eq!(summary.items, 1);
    assert_eq!(store.count_scores(summary.run_id)?, 5);
    Ok(())
}

#[test]
fn test_empty_catalog_completes_with_no_scores() -> anyhow::Result<()> {
    let store = common::seeded_store(&[])?;
    let summary = Engine::new(store.clone())
        .run_batch(RunOptions::default(), &CancelToken::new())
        .map_err(|f| f.error)?;
    assert_eq!(summary.items, 0);
    assert_eq!(
        store.get_run(summary.run_id)?.unwrap().status,
        RunStatus::Completed
    );
    Ok(())
}

#[test]
fn test_non_finite_spec_values_keep_breakdown_readable() -> anyhow::Result<()> {
    let mut spec = reference_spec(1);
    spec.max_lumens = Some(f64::INFINITY);
    let store = common::seeded_store(&[("Overflow", spec)])?;

    let summary = Engine::new(store.clone())
        .run_batch(RunOptions::default(), &CancelToken::new())
        .map_err(|f| f.error)?;

    for slug in ProfileSlug::ALL {
        let breakdown = store
            .score_breakdown(summary.run_id, 1, slug)?
            .expect("breakdown row");
        assert!(!breakdown.raw.contains_key("max_lumens"));
        assert!(breakdown.raw.values().all(|v| v.is_finite()));
    }
    Ok(())
}
