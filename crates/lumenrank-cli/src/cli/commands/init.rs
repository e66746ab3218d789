use super::exit_codes;
use crate::cli::args::InitArgs;

pub fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    let store = super::open_store(&args.db.db)?;
    let stats = store.stats_best_effort()?;
    eprintln!(
        "initialized {} ({} runs, {} completed, {} scores, {} active items)",
        args.db.db.display(),
        stats.runs,
        stats.completed_runs,
        stats.scores,
        stats.active_items
    );
    Ok(exit_codes::OK)
}
