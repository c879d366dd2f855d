//! Run statistics.
//!
//! Aggregated counters over every mapping of a run.

use serde::{Deserialize, Serialize};

use super::report::{MappingOutcome, MappingReport};

/// Statistics for a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Mappings processed.
    #[serde(default)]
    pub mappings_total: u32,
    /// Mappings that completed (applied or dry-run) without partial failures.
    #[serde(default)]
    pub mappings_succeeded: u32,
    /// Mappings skipped because of an error.
    #[serde(default)]
    pub mappings_failed: u32,
    /// Mappings computed but not applied.
    #[serde(default)]
    pub mappings_dry_run: u32,
    /// Desired handles without a platform account, summed over mappings.
    #[serde(default)]
    pub unmatched: u32,
    /// Invites planned.
    #[serde(default)]
    pub invites_planned: u32,
    /// Kicks planned.
    #[serde(default)]
    pub kicks_planned: u32,
    /// Invites that went through.
    #[serde(default)]
    pub invites_applied: u32,
    /// Kicks that went through.
    #[serde(default)]
    pub kicks_applied: u32,
    /// Individual invite/kick failures.
    #[serde(default)]
    pub partial_failures: u32,
    /// Total duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl RunStatistics {
    /// Create new empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one mapping's outcome.
    pub fn record(&mut self, report: &MappingReport) {
        self.mappings_total += 1;

        match report.outcome {
            MappingOutcome::Applied => self.mappings_succeeded += 1,
            MappingOutcome::DryRun => {
                self.mappings_succeeded += 1;
                self.mappings_dry_run += 1;
            }
            MappingOutcome::PartiallyApplied => {}
            MappingOutcome::Failed => self.mappings_failed += 1,
        }

        if let Some(plan) = &report.plan {
            self.unmatched += count(plan.unmatched.len());
            self.invites_planned += count(plan.invite.len());
            self.kicks_planned += count(plan.kick.len());
        }

        if let Some(applied) = &report.applied {
            self.invites_applied += count(applied.invited.len());
            self.kicks_applied += count(applied.kicked.len());
            self.partial_failures += count(applied.failures.len());
        }
    }

    /// Whether any mapping failed or had partial failures.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.mappings_failed > 0 || self.partial_failures > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::applier::{ApplyReport, MutationAction, PartialFailure};
    use crate::reconciliation::engine::ReconciliationPlan;
    use crate::reconciliation::report::MappingFailure;
    use chansync_connector::types::{ChannelPattern, IdentityHandle, Visibility};

    fn handle(s: &str) -> IdentityHandle {
        IdentityHandle::parse(s).unwrap()
    }

    fn report(outcome: MappingOutcome) -> MappingReport {
        MappingReport {
            label: "ops".to_string(),
            pattern: ChannelPattern::exact("ops"),
            visibility: Visibility::Private,
            dry_run: outcome == MappingOutcome::DryRun,
            outcome,
            channel: None,
            ambiguous_matches: Vec::new(),
            plan: None,
            applied: None,
            error: None,
        }
    }

    #[test]
    fn test_record_counts_outcomes() {
        let mut stats = RunStatistics::new();

        let mut dry = report(MappingOutcome::DryRun);
        dry.plan = Some(ReconciliationPlan {
            desired_valid: [handle("alice")].into(),
            unmatched: [handle("zed")].into(),
            invite: [handle("alice")].into(),
            kick: [handle("carol"), handle("dave")].into(),
        });
        stats.record(&dry);

        let mut failed = report(MappingOutcome::Failed);
        failed.error = Some(MappingFailure {
            error_code: "CHANNEL_NOT_FOUND".to_string(),
            message: "Channel not found".to_string(),
        });
        stats.record(&failed);

        assert_eq!(stats.mappings_total, 2);
        assert_eq!(stats.mappings_succeeded, 1);
        assert_eq!(stats.mappings_dry_run, 1);
        assert_eq!(stats.mappings_failed, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.invites_planned, 1);
        assert_eq!(stats.kicks_planned, 2);
        assert_eq!(stats.invites_applied, 0);
        assert!(stats.has_failures());
    }

    #[test]
    fn test_record_partial_failures() {
        let mut stats = RunStatistics::new();

        let mut partial = report(MappingOutcome::PartiallyApplied);
        partial.applied = Some(ApplyReport {
            invited: vec![handle("alice")],
            kicked: Vec::new(),
            failures: vec![PartialFailure {
                handle: handle("bob"),
                action: MutationAction::Kick,
                error_code: "OPERATION_FAILED".to_string(),
                cause: "error-user-not-in-room".to_string(),
            }],
            calls_made: 2,
        });
        stats.record(&partial);

        assert_eq!(stats.mappings_succeeded, 0);
        assert_eq!(stats.mappings_failed, 0);
        assert_eq!(stats.invites_applied, 1);
        assert_eq!(stats.partial_failures, 1);
        assert!(stats.has_failures());
    }

    #[test]
    fn test_clean_run_has_no_failures() {
        let mut stats = RunStatistics::new();
        stats.record(&report(MappingOutcome::Applied));
        assert!(!stats.has_failures());
    }
}
