use super::exit_codes;
use crate::cli::args::RunsArgs;
use lumenrank_core::report::console::print_runs;

pub fn cmd_runs(args: RunsArgs) -> anyhow::Result<i32> {
    let store = super::open_store(&args.db.db)?;
    let runs = store.list_runs(args.limit)?;
    print_runs(&runs);
    Ok(exit_codes::OK)
}
