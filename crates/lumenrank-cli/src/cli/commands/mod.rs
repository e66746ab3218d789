use super::args::*;
use anyhow::Context;
use lumenrank_core::config::load_formula_registry;
use lumenrank_core::engine::{BatchSummary, CancelToken, Engine};
use lumenrank_core::errors::{ConfigError, RunFailure};
use lumenrank_core::model::RunOptions;
use lumenrank_core::scoring::FormulaRegistry;
use lumenrank_core::storage::Store;
use std::path::Path;
use std::sync::Arc;

pub mod formula;
pub mod init;
pub mod rankings;
pub mod run;
pub mod runs;
pub mod worker;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const RUN_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => init::cmd_init(args),
        Command::Run(args) => run::cmd_run(args).await,
        Command::Worker(args) => worker::cmd_worker(args).await,
        Command::Runs(args) => runs::cmd_runs(args),
        Command::Rankings(args) => rankings::cmd_rankings(args),
        Command::Formula(args) => formula::cmd_formula(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

/// Opens the store and makes sure the schema exists.
fn open_store(db: &Path) -> anyhow::Result<Store> {
    let store = Store::open(db).with_context(|| format!("open {}", db.display()))?;
    store.init_schema()?;
    Ok(store)
}

fn load_formulas(src: &FormulaSource) -> Result<FormulaRegistry, ConfigError> {
    load_formula_registry(src.formula_file.as_deref(), src.strict)
}

/// Executes one batch on the blocking pool; the outer error only covers a panicked task.
async fn run_once(
    engine: Arc<Engine>,
    opts: RunOptions,
    token: CancelToken,
) -> anyhow::Result<Result<BatchSummary, RunFailure>> {
    tokio::task::spawn_blocking(move || engine.run_batch(opts, &token))
        .await
        .context("scoring task aborted")
}
