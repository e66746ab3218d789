use super::exit_codes;
use crate::cli::args::RankingsArgs;
use lumenrank_core::model::{ProfileSlug, RankedScore, RunRow, RunStatus};
use lumenrank_core::report::console::format_rankings;
use lumenrank_core::scoring::Breakdown;
use serde::Serialize;

#[derive(Serialize)]
struct RankingsReport<'a> {
    run: &'a RunRow,
    profile: ProfileSlug,
    rankings: Vec<RankingEntry<'a>>,
}

#[derive(Serialize)]
struct RankingEntry<'a> {
    #[serde(flatten)]
    row: &'a RankedScore,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<Breakdown>,
}

pub fn cmd_rankings(args: RankingsArgs) -> anyhow::Result<i32> {
    let Some(profile) = ProfileSlug::parse(&args.profile) else {
        eprintln!(
            "config error: unknown profile '{}' (expected one of: {})",
            args.profile,
            ProfileSlug::ALL.map(|p| p.as_str()).join(", ")
        );
        return Ok(exit_codes::CONFIG_ERROR);
    };
    if args.format != "text" && args.format != "json" {
        eprintln!("config error: unknown format '{}' (text|json)", args.format);
        return Ok(exit_codes::CONFIG_ERROR);
    }

    let store = super::open_store(&args.db.db)?;
    let run = match args.run_id {
        Some(id) => match store.get_run(id)? {
            Some(run) => run,
            None => {
                eprintln!("no scoring run with id {}", id);
                return Ok(exit_codes::RUN_FAILED);
            }
        },
        None => match store.latest_completed_run()? {
            Some(run) => run,
            None => {
                eprintln!("no completed scoring run found");
                return Ok(exit_codes::RUN_FAILED);
            }
        },
    };
    if run.status != RunStatus::Completed {
        eprintln!(
            "warning: run {} is {}; ranks may be missing",
            run.id,
            run.status.as_str()
        );
    }

    let rows = store.rankings(run.id, profile, args.limit, args.offset)?;
    if args.format == "json" {
        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let breakdown = if args.breakdown {
                store.score_breakdown(run.id, row.flashlight_id, profile)?
            } else {
                None
            };
            entries.push(RankingEntry { row, breakdown });
        }
        let report = RankingsReport {
            run: &run,
            profile,
            rankings: entries,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_rankings(&run, &rows));
    }
    Ok(exit_codes::OK)
}
