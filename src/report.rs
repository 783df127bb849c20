//! Human and JSON renderings of plans, relocation outcomes and errors.

use colored::Colorize;
use serde_json::json;

use crate::error::GrouperError;
use crate::model::{GroupPlan, GroupingConfig};
use crate::pipeline::RunOutcome;
use crate::relocate::RelocationReport;

/// Summary printed before asking for confirmation.
pub fn render_plan(plan: &GroupPlan, config: &GroupingConfig) -> String {
    let mut out = format!(
        "{} {} .{} file(s) in {}\n",
        "Found".bold(),
        plan.total_files,
        config.extension,
        plan.target_dir.display()
    );
    if !plan.skipped.is_empty() {
        out.push_str(&format!(
            "{} {} file(s) with unparseable names:\n",
            "Skipped".yellow().bold(),
            plan.skipped.len()
        ));
        for skipped in &plan.skipped {
            out.push_str(&format!("  {} ({})\n", skipped.filename, skipped.reason));
        }
    }
    out.push_str(&format!(
        "{} {} group(s) using a {}..={} second window:\n",
        "Computed".bold(),
        plan.groups.len(),
        config.window.min_gap_secs(),
        config.window.max_gap_secs()
    ));
    for (i, group) in plan.groups.iter().enumerate() {
        out.push_str(&format!(
            "  Group {}: {} ({} file(s))\n",
            i + 1,
            group.name().cyan(),
            group.len()
        ));
        for name in group.filenames() {
            out.push_str(&format!("    {name}\n"));
        }
    }
    out
}

pub fn render_relocation(report: &RelocationReport) -> String {
    let mut out = String::new();
    for dir in &report.directories {
        out.push_str(&format!(
            "{} {} ({} file(s))\n",
            "Created".green(),
            dir.path.display(),
            dir.files
        ));
    }
    out.push_str(&format!(
        "{} Moved {} file(s) into {} session director(ies).\n",
        "Done.".green().bold(),
        report.moved_files,
        report.directories.len()
    ));
    out
}

pub fn plan_json(plan: &GroupPlan, config: &GroupingConfig) -> serde_json::Value {
    json!({
        "target_dir": plan.target_dir,
        "extension": config.extension,
        "zone": config.zone,
        "window": config.window,
        "total_files": plan.total_files,
        "group_count": plan.groups.len(),
        "groups": plan.groups,
        "skipped": plan.skipped,
    })
}

pub fn outcome_json(
    plan: &GroupPlan,
    config: &GroupingConfig,
    outcome: &RunOutcome,
) -> serde_json::Value {
    let (status, relocation, steps) = match outcome {
        RunOutcome::DryRun => ("dry_run", None, Vec::new()),
        RunOutcome::Cancelled => ("cancelled", None, Vec::new()),
        RunOutcome::Completed {
            relocation,
            steps_run,
        } => ("completed", Some(relocation), steps_run.clone()),
    };
    json!({
        "ok": true,
        "status": status,
        "plan": plan_json(plan, config),
        "relocation": relocation,
        "steps_run": steps,
    })
}

pub fn error_json(err: &GrouperError) -> serde_json::Value {
    json!({
        "ok": false,
        "error_type": err.error_type(),
        "message": err.to_string(),
        "relocated": err.relocated_dirs(),
    })
}
