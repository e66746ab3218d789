use super::exit_codes;
use crate::cli::args::WorkerArgs;
use crate::config::WorkerConfig;
use chrono::{DateTime, Utc};
use lumenrank_core::engine::{CancelToken, Engine};
use lumenrank_core::model::RunOptions;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

/// Runs a batch every interval until Ctrl-C. A failed cycle is logged and the next one is
/// attempted on schedule; an in-flight batch is cancelled on shutdown.
pub async fn cmd_worker(args: WorkerArgs) -> anyhow::Result<i32> {
    let cfg = WorkerConfig::from_env();
    let formulas = match super::load_formulas(&args.formulas) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let store = super::open_store(&args.db.db)?;
    let engine = Arc::new(Engine::with_formulas(store, formulas));

    tracing::info!(event = "worker.start", db = %args.db.db.display(), config = ?cfg);

    let mut ticker = tokio::time::interval(cfg.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !cfg.run_on_start {
        // the first tick completes immediately
        ticker.tick().await;
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut cycles: u64 = 0;
    loop {
        if args.max_cycles.is_some_and(|max| cycles >= max) {
            break;
        }
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(event = "worker.shutdown", cycles);
                return Ok(exit_codes::OK);
            }
            _ = ticker.tick() => {}
        }
        cycles += 1;

        let opts = RunOptions {
            run_label: worker_label(Utc::now()),
            formula_version: cfg.formula_version.clone(),
            initiated_by: cfg.initiated_by.clone(),
        };
        let token = CancelToken::with_timeout(cfg.timeout());
        let task = super::run_once(engine.clone(), opts, token.clone());
        tokio::pin!(task);

        let mut stopping = false;
        let outcome = tokio::select! {
            res = &mut task => res,
            _ = &mut shutdown => {
                tracing::warn!(event = "worker.cancel_inflight", cycle = cycles);
                token.cancel();
                stopping = true;
                task.await
            }
        };

        match outcome {
            Ok(Ok(summary)) => tracing::info!(
                event = "worker.cycle_completed",
                cycle = cycles,
                run_id = summary.run_id,
                items = summary.items
            ),
            Ok(Err(failure)) => tracing::error!(
                event = "worker.cycle_failed",
                cycle = cycles,
                run_id = ?failure.run_id,
                cancelled = failure.is_cancelled(),
                error = %format!("{:#}", failure.error)
            ),
            Err(e) => tracing::error!(
                event = "worker.cycle_aborted",
                cycle = cycles,
                error = %format!("{:#}", e)
            ),
        }

        if stopping {
            tracing::info!(event = "worker.shutdown", cycles);
            return Ok(exit_codes::OK);
        }
    }

    tracing::info!(event = "worker.finished", cycles);
    Ok(exit_codes::OK)
}

/// Worker runs are labelled apart from one-shot `batch-` runs.
fn worker_label(now: DateTime<Utc>) -> String {
    format!("worker-{}", now.format("%Y%m%d-%H%M%S"))
}
