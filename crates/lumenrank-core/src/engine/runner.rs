use super::cancel::CancelToken;
use crate::errors::{Cancelled, RunFailure};
use crate::model::{ProfileSlug, RunOptions};
use crate::scoring::{FormulaRegistry, Scorer};
use crate::storage::{catalog, rank, runs, scores, unit_of_work, Store};
use anyhow::Context;
use rusqlite::Connection;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub run_id: i64,
    pub formula_version: String,
    pub items: usize,
    pub scores_written: usize,
    pub ranked: usize,
}

pub struct Engine {
    pub store: Store,
    pub formulas: FormulaRegistry,
}

impl Engine {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            formulas: FormulaRegistry::builtin(),
        }
    }

    pub fn with_formulas(store: Store, formulas: FormulaRegistry) -> Self {
        Self { store, formulas }
    }

    /// Scores every active item under a new run and ranks the result.
    ///
    /// The run row is committed before scoring starts so a failed run stays observable.
    /// Scores, ranks and the `completed` transition share one unit of work: on any error
    /// none of them persist, the run is marked `failed`, and the error is returned with
    /// the allocated run id. Nothing is retried here.
    pub fn run_batch(
        &self,
        opts: RunOptions,
        cancel: &CancelToken,
    ) -> Result<BatchSummary, RunFailure> {
        let opts = opts.with_defaults(chrono::Utc::now());
        let formula = self.formulas.resolve(&opts.formula_version);
        let scorer = Scorer::new(formula).map_err(|e| RunFailure::new(None, e))?;

        let mut conn = self.store.lock().map_err(|e| RunFailure::new(None, e))?;
        let run_id = runs::start_run(&conn, &opts).map_err(|e| RunFailure::new(None, e))?;

        tracing::info!(
            event = "score_run.started",
            run_id,
            label = %opts.run_label,
            formula_version = %opts.formula_version,
            initiated_by = %opts.initiated_by
        );
        let started = Instant::now();

        let interrupt = conn.get_interrupt_handle();
        let outcome = cancel
            .interrupt_on_cancel(interrupt, || {
                unit_of_work::within(&mut conn, |tx| {
                    score_and_rank(tx, run_id, &scorer, &opts.formula_version, cancel)
                })
            })
            .map_err(|err| attribute_cancel(err, cancel));

        match outcome {
            Ok(summary) => {
                tracing::info!(
                    event = "score_run.completed",
                    run_id,
                    items = summary.items,
                    scores = summary.scores_written,
                    elapsed_ms = started.elapsed().as_millis() as u64
                );
                Ok(summary)
            }
            Err(err) => {
                if let Err(mark_err) = runs::fail_run(&conn, run_id, &err) {
                    tracing::warn!(
                        event = "score_run.fail_mark_error",
                        run_id,
                        error = %format!("{:#}", mark_err),
                        "could not record run failure"
                    );
                }
                tracing::error!(
                    event = "score_run.failed",
                    run_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %format!("{:#}", err)
                );
                Err(RunFailure::new(Some(run_id), err))
            }
        }
    }
}

/// An interrupted statement surfaces as a SQLite error; tag it with the cause so callers
/// can still tell a cancelled run apart.
fn attribute_cancel(err: anyhow::Error, cancel: &CancelToken) -> anyhow::Error {
    if err.downcast_ref::<Cancelled>().is_some() {
        return err;
    }
    match cancel.check() {
        Err(cause) => err.context(cause),
        Ok(()) => err,
    }
}

fn score_and_rank(
    tx: &Connection,
    run_id: i64,
    scorer: &Scorer<'_>,
    formula_version: &str,
    cancel: &CancelToken,
) -> anyhow::Result<BatchSummary> {
    let profiles = scores::ensure_profiles(tx, &ProfileSlug::ALL)
        .context("initialize scoring profiles")?;

    cancel.check()?;
    let specs = catalog::load_active_specs(tx).context("load spec snapshot")?;
    tracing::debug!(event = "score_run.snapshot", run_id, items = specs.len());

    let mut written = 0;
    for row in &specs {
        cancel.check()?;
        let card = scorer.compute_scores(row, formula_version);
        let breakdown = card
            .breakdown
            .to_json()
            .with_context(|| format!("encode breakdown for flashlight {}", row.flashlight_id))?;
        for slug in ProfileSlug::ALL {
            scores::upsert_score(
                tx,
                run_id,
                row.flashlight_id,
                profiles.get(slug)?,
                card.scores.get(slug),
                &breakdown,
            )?;
            written += 1;
        }
    }

    cancel.check()?;
    let ranked = rank::rank_run(tx, run_id)?;

    cancel.check()?;
    runs::complete_run(tx, run_id)?;

    Ok(BatchSummary {
        run_id,
        formula_version: formula_version.to_string(),
        items: specs.len(),
        scores_written: written,
        ranked,
    })
}
