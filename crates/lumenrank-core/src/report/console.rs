use crate::engine::BatchSummary;
use crate::model::{RankedScore, RunRow, RunStatus};

pub fn print_batch_summary(summary: &BatchSummary) {
    eprintln!(
        "\nScored {} items under formula {} ({} scores, {} ranked)",
        summary.items, summary.formula_version, summary.scores_written, summary.ranked
    );
}

pub fn format_run_line(run: &RunRow) -> String {
    let icon = match run.status {
        RunStatus::Completed => "✅",
        RunStatus::Failed => "❌",
        RunStatus::Running => "⏳",
    };
    let finished = run.completed_at.as_deref().unwrap_or("-");
    let mut line = format!(
        "{} #{:<5} {:<10} {:<28} {:<6} by {:<10} started {}  finished {}",
        icon,
        run.id,
        run.status.as_str(),
        run.run_label,
        run.formula_version,
        run.initiated_by,
        run.started_at,
        finished
    );
    if let Some(notes) = run.notes.as_deref().filter(|n| !n.is_empty()) {
        line.push_str("\n    ");
        line.push_str(&first_line(notes, 160));
    }
    line
}

pub fn print_runs(runs: &[RunRow]) {
    if runs.is_empty() {
        println!("no scoring runs recorded");
        return;
    }
    for run in runs {
        println!("{}", format_run_line(run));
    }
}

pub fn format_rankings(run: &RunRow, rows: &[RankedScore]) -> String {
    let mut out = String::new();
    let profile = rows.first().map(|r| r.profile.as_str()).unwrap_or("-");
    out.push_str(&format!(
        "Run #{} ({}, formula {}) profile {}\n",
        run.id, run.run_label, run.formula_version, profile
    ));
    out.push_str(&format!("{:>4}  {:>8}  {:>6}  {}\n", "RANK", "SCORE", "ID", "NAME"));
    for r in rows {
        out.push_str(&format!(
            "{:>4}  {:>8.3}  {:>6}  {}\n",
            r.rank, r.score, r.flashlight_id, r.name
        ));
    }
    out
}

fn first_line(s: &str, max_chars: usize) -> String {
    let line = s.lines().next().unwrap_or_default();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let cut: String = line.chars().take(max_chars).collect();
    format!("{}…", cut)
}
