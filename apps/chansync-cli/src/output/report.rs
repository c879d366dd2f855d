//! Run report rendering

use clap::ValueEnum;
use std::collections::BTreeSet;

use chansync_connector::types::IdentityHandle;
use chansync_provisioning::{MappingOutcome, MappingReport, RunReport, RunStatistics};

use crate::error::CliResult;

/// Report layout on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One block per mapping plus a summary line.
    #[default]
    Text,
    /// The full run report as JSON.
    Json,
}

/// Print the run report in the requested format.
pub fn print_report(report: &RunReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Text => print!("{}", render_text(report)),
    }
    Ok(())
}

fn join(handles: &BTreeSet<IdentityHandle>) -> String {
    if handles.is_empty() {
        return "-".to_string();
    }
    handles
        .iter()
        .map(IdentityHandle::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_mapping(mapping: &MappingReport, lines: &mut Vec<String>) {
    let outcome = match mapping.outcome {
        MappingOutcome::Applied => "applied",
        MappingOutcome::DryRun => "dry run",
        MappingOutcome::PartiallyApplied => "partially applied",
        MappingOutcome::Failed => "failed",
    };
    lines.push(format!("[{}] {}", mapping.label, outcome));

    match &mapping.channel {
        Some(channel) => lines.push(format!(
            "  channel: {} ({}, id {})",
            channel.name, channel.visibility, channel.id
        )),
        None => lines.push(format!(
            "  channel: {} ({})",
            mapping.pattern, mapping.visibility
        )),
    }

    if !mapping.ambiguous_matches.is_empty() {
        lines.push(format!(
            "  warning: pattern matched several channels: {}",
            mapping.ambiguous_matches.join(", ")
        ));
    }

    if let Some(plan) = &mapping.plan {
        if !plan.unmatched.is_empty() {
            lines.push(format!(
                "  warning: no chat account for: {}",
                join(&plan.unmatched)
            ));
        }
        lines.push(format!("  invite: {}", join(&plan.invite)));
        lines.push(format!("  kick: {}", join(&plan.kick)));
    }

    if let Some(applied) = &mapping.applied {
        lines.push(format!(
            "  done: {} invited, {} kicked",
            applied.invited.len(),
            applied.kicked.len()
        ));
        for failure in &applied.failures {
            lines.push(format!(
                "  failed {} {}: {} ({})",
                failure.action, failure.handle, failure.error_code, failure.cause
            ));
        }
    }

    if let Some(error) = &mapping.error {
        lines.push(format!("  error: {}: {}", error.error_code, error.message));
    }
}

fn render_summary(stats: &RunStatistics) -> String {
    format!(
        "{} mapping(s): {} succeeded ({} dry run), {} failed; {} invited, {} kicked, {} change(s) failed in {} ms",
        stats.mappings_total,
        stats.mappings_succeeded,
        stats.mappings_dry_run,
        stats.mappings_failed,
        stats.invites_applied,
        stats.kicks_applied,
        stats.partial_failures,
        stats.duration_ms,
    )
}

/// Render the report as plain text.
pub fn render_text(report: &RunReport) -> String {
    let mut lines = Vec::new();

    if report.dry_run_forced {
        lines.push("Dry run: no mapping is applied".to_string());
        lines.push(String::new());
    }

    for mapping in &report.mappings {
        render_mapping(mapping, &mut lines);
        lines.push(String::new());
    }

    lines.push(render_summary(&report.statistics));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
