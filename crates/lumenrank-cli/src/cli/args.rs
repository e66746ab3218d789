use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lumenrank",
    version,
    about = "Batch scoring and ranking of flashlights by use-case profile"
)]
pub struct Cli {
    /// tracing filter directive, e.g. `info` or `lumenrank_core=debug`
    #[arg(long, global = true, env = "LUMENRANK_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database schema (idempotent)
    Init(InitArgs),
    /// Execute one scoring batch
    Run(RunArgs),
    /// Execute scoring batches on a fixed interval until interrupted
    Worker(WorkerArgs),
    /// List recent scoring runs
    Runs(RunsArgs),
    /// Show the ranked list for one profile
    Rankings(RankingsArgs),
    /// Print a formula bound set as YAML
    Formula(FormulaArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DbArgs {
    #[arg(long, env = "LUMENRANK_DB", default_value = ".lumenrank/scores.db")]
    pub db: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct FormulaSource {
    /// YAML file with additional formula versions
    #[arg(long, env = "SCORING_FORMULA_FILE")]
    pub formula_file: Option<PathBuf>,

    /// reject unknown keys in the formula file
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[command(flatten)]
    pub db: DbArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub formulas: FormulaSource,

    /// run label (default: batch-<UTC timestamp>)
    #[arg(long, env = "SCORING_RUN_LABEL", default_value = "")]
    pub label: String,

    #[arg(long, env = "SCORING_FORMULA_VERSION", default_value = "v1")]
    pub formula_version: String,

    #[arg(long, env = "SCORING_INITIATED_BY", default_value = "scorejob")]
    pub initiated_by: String,

    /// abort the batch after this many seconds
    #[arg(long, env = "SCOREJOB_TIMEOUT_SEC", default_value_t = 120)]
    pub timeout_secs: u64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct WorkerArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[command(flatten)]
    pub formulas: FormulaSource,

    /// stop after this many cycles (runs forever when unset)
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunsArgs {
    #[command(flatten)]
    pub db: DbArgs,

    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RankingsArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// tactical | edc | value | throw | flood
    #[arg(long)]
    pub profile: String,

    /// defaults to the latest completed run
    #[arg(long)]
    pub run_id: Option<i64>,

    #[arg(long, default_value_t = 20)]
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json

    /// include the stored metric breakdown (json only)
    #[arg(long)]
    pub breakdown: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct FormulaArgs {
    #[command(flatten)]
    pub formulas: FormulaSource,

    #[arg(long = "version", visible_alias = "formula-version", default_value = "v1")]
    pub formula_version: String,
}
