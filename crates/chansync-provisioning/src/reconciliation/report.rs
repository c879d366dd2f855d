//! Mapping and run reports.
//!
//! Every decision the runner takes ends up here: resolved channel,
//! unmatched handles, planned changes, per-handle apply outcome and
//! failure cause.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chansync_connector::types::{ChannelPattern, ChannelRef, Visibility};

use super::applier::ApplyReport;
use super::engine::ReconciliationPlan;
use super::statistics::RunStatistics;
use crate::error::MappingError;

/// Final state of one mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingOutcome {
    /// Changes computed and all of them applied.
    Applied,
    /// Changes computed but not sent.
    DryRun,
    /// Changes sent, some of them failed.
    PartiallyApplied,
    /// Mapping skipped because of an error.
    Failed,
}

/// Why a mapping was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFailure {
    pub error_code: String,
    pub message: String,
}

impl From<&MappingError> for MappingFailure {
    fn from(error: &MappingError) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Report for one mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingReport {
    /// Mapping label.
    pub label: String,
    /// Channel pattern as configured.
    pub pattern: ChannelPattern,
    /// Channel kind searched.
    pub visibility: Visibility,
    /// Whether mutations were suppressed.
    pub dry_run: bool,
    /// Final state.
    pub outcome: MappingOutcome,
    /// Channel that was reconciled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelRef>,
    /// All candidates when the pattern matched more than one channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ambiguous_matches: Vec<String>,
    /// Computed delta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ReconciliationPlan>,
    /// Apply outcome (absent for dry-run and failed mappings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<ApplyReport>,
    /// Failure cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MappingFailure>,
}

impl MappingReport {
    /// Whether the mapping failed or had partial failures.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        matches!(
            self.outcome,
            MappingOutcome::Failed | MappingOutcome::PartiallyApplied
        )
    }
}

/// Report for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run ID.
    pub run_id: Uuid,
    /// Started at.
    pub started_at: DateTime<Utc>,
    /// Completed at.
    pub completed_at: DateTime<Utc>,
    /// Every mapping was forced to dry-run.
    pub dry_run_forced: bool,
    /// Accounts in the account index.
    pub accounts_indexed: usize,
    /// Per-mapping reports, in declaration order.
    pub mappings: Vec<MappingReport>,
    /// Statistics.
    pub statistics: RunStatistics,
}

impl RunReport {
    /// Whether any mapping failed or had partial failures.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.statistics.has_failures()
    }
}
