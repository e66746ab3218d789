use super::exit_codes;
use crate::cli::args::RunArgs;
use lumenrank_core::engine::{CancelToken, Engine};
use lumenrank_core::model::RunOptions;
use lumenrank_core::report::console::print_batch_summary;
use std::sync::Arc;
use std::time::Duration;

pub async fn cmd_run(args: RunArgs) -> anyhow::Result<i32> {
    let formulas = match super::load_formulas(&args.formulas) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let store = super::open_store(&args.db.db)?;
    let engine = Arc::new(Engine::with_formulas(store, formulas));

    let opts = RunOptions {
        run_label: args.label,
        formula_version: args.formula_version,
        initiated_by: args.initiated_by,
    };
    let token = CancelToken::with_timeout(Duration::from_secs(args.timeout_secs));

    match super::run_once(engine, opts, token).await? {
        Ok(summary) => {
            print_batch_summary(&summary);
            println!("scoring run completed: run_id={}", summary.run_id);
            Ok(exit_codes::OK)
        }
        Err(failure) => {
            eprintln!("{}", failure);
            Ok(exit_codes::RUN_FAILED)
        }
    }
}
