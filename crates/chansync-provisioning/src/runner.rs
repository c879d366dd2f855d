//! Mapping runner.
//!
//! Processes mappings one after another against a single directory
//! connection and a single chat-platform session. A failing mapping is
//! reported and the run continues with the next one.

use chrono::Utc;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use chansync_connector::traits::{ChatPlatform, DirectoryResolver};
use chansync_connector::types::IdentityHandle;

use crate::error::{MappingError, SyncError, SyncResult};
use crate::mapping::MappingDefinition;
use crate::reconciliation::{
    reconcile, AccountIndex, MappingFailure, MappingOutcome, MappingReport,
    MembershipSnapshotProvider, MutationApplier, RunReport, RunStatistics,
};

/// Run-wide overrides.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Force every mapping to dry-run regardless of its `apply` flag.
    pub force_dry_run: bool,
    /// Restrict the run to these mapping labels (empty means all).
    pub only: Vec<String>,
}

/// Wires directory, snapshot, engine and applier together per mapping.
pub struct MappingRunner<'a> {
    directory: &'a dyn DirectoryResolver,
    platform: &'a dyn ChatPlatform,
    options: RunOptions,
}

fn join_handles(handles: &BTreeSet<IdentityHandle>) -> String {
    handles
        .iter()
        .map(IdentityHandle::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl<'a> MappingRunner<'a> {
    pub fn new(directory: &'a dyn DirectoryResolver, platform: &'a dyn ChatPlatform) -> Self {
        Self {
            directory,
            platform,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Mappings to process, in declaration order.
    pub fn select<'m>(
        &self,
        mappings: &'m [MappingDefinition],
    ) -> SyncResult<Vec<&'m MappingDefinition>> {
        if self.options.only.is_empty() {
            return Ok(mappings.iter().collect());
        }

        let unknown: Vec<String> = self
            .options
            .only
            .iter()
            .filter(|label| !mappings.iter().any(|m| m.label() == label.as_str()))
            .cloned()
            .collect();

        if !unknown.is_empty() {
            return Err(SyncError::UnknownMappings { labels: unknown });
        }

        Ok(mappings
            .iter()
            .filter(|m| self.options.only.iter().any(|label| label == m.label()))
            .collect())
    }

    /// Run every selected mapping.
    ///
    /// Fails only when the run cannot start: unknown mapping filter or an
    /// account index that cannot be built. Mapping failures end up in the
    /// report.
    #[instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn run(&self, mappings: &[MappingDefinition]) -> SyncResult<RunReport> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let started_at = Utc::now();
        let clock = Instant::now();

        let selected = self.select(mappings)?;

        info!(
            mappings = selected.len(),
            dry_run_forced = self.options.force_dry_run,
            "Starting sync run"
        );

        let accounts = AccountIndex::build(self.platform)
            .await
            .map_err(SyncError::AccountIndex)?;

        let mut statistics = RunStatistics::new();
        let mut reports = Vec::with_capacity(selected.len());

        for mapping in selected {
            let report = self.run_mapping(mapping, &accounts).await;
            statistics.record(&report);
            reports.push(report);
        }

        statistics.duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            total = statistics.mappings_total,
            succeeded = statistics.mappings_succeeded,
            failed = statistics.mappings_failed,
            partial_failures = statistics.partial_failures,
            duration_ms = statistics.duration_ms,
            "Sync run finished"
        );

        Ok(RunReport {
            run_id,
            started_at,
            completed_at: Utc::now(),
            dry_run_forced: self.options.force_dry_run,
            accounts_indexed: accounts.len(),
            mappings: reports,
            statistics,
        })
    }

    /// Process one mapping. Never fails; errors are captured in the report.
    #[instrument(skip_all, fields(mapping = %mapping.label()))]
    pub async fn run_mapping(
        &self,
        mapping: &MappingDefinition,
        accounts: &AccountIndex,
    ) -> MappingReport {
        let dry_run = self.options.force_dry_run || !mapping.apply;

        let mut report = MappingReport {
            label: mapping.label().to_string(),
            pattern: mapping.pattern(),
            visibility: mapping.visibility(),
            dry_run,
            outcome: MappingOutcome::Failed,
            channel: None,
            ambiguous_matches: Vec::new(),
            plan: None,
            applied: None,
            error: None,
        };

        if let Err(e) = self
            .reconcile_mapping(mapping, accounts, dry_run, &mut report)
            .await
        {
            error!(
                mapping = %mapping.label(),
                error_code = e.error_code(),
                error = %e,
                "Mapping failed, continuing with the next mapping"
            );
            report.outcome = MappingOutcome::Failed;
            report.error = Some(MappingFailure::from(&e));
        }

        report
    }

    async fn reconcile_mapping(
        &self,
        mapping: &MappingDefinition,
        accounts: &AccountIndex,
        dry_run: bool,
        report: &mut MappingReport,
    ) -> Result<(), MappingError> {
        mapping.validate()?;

        let snapshot = MembershipSnapshotProvider::new(self.platform)
            .snapshot(&mapping.pattern(), mapping.visibility())
            .await?;

        report.channel = Some(snapshot.channel.clone());
        report.ambiguous_matches = snapshot.ambiguous_matches.clone();

        let directory_handles = self.directory.resolve(&mapping.ldap_query).await?;

        let plan = reconcile(
            &directory_handles,
            &mapping.static_handles(),
            accounts,
            &snapshot.member_handles(),
        );

        if !plan.unmatched.is_empty() {
            warn!(
                unmatched = %join_handles(&plan.unmatched),
                "Users without a chat account are ignored"
            );
        }

        info!(
            channel_id = %snapshot.channel.id,
            invite = %join_handles(&plan.invite),
            kick = %join_handles(&plan.kick),
            "Planned membership changes"
        );

        if dry_run {
            info!("Dry run, no changes sent");
            report.outcome = MappingOutcome::DryRun;
            report.plan = Some(plan);
            return Ok(());
        }

        let applied = MutationApplier::new(self.platform, accounts)
            .apply(&snapshot, &plan.invite, &plan.kick)
            .await;

        info!(
            invited = applied.invited.len(),
            kicked = applied.kicked.len(),
            failures = applied.failures.len(),
            "Membership changes applied"
        );

        report.outcome = if applied.is_complete() {
            MappingOutcome::Applied
        } else {
            MappingOutcome::PartiallyApplied
        };
        report.plan = Some(plan);
        report.applied = Some(applied);

        Ok(())
    }
}
