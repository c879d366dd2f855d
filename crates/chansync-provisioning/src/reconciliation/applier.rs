//! Mutation applier.
//!
//! Sends invite and kick calls for one channel. Each call stands alone: a
//! failure is recorded against its handle and the remaining calls still go
//! out. Nothing already applied is rolled back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{info, instrument, warn};

use chansync_connector::traits::ChatPlatform;
use chansync_connector::types::{AccountId, IdentityHandle};

use super::account_index::AccountIndex;
use super::snapshot::ChannelSnapshot;

/// Error code recorded when a handle has no account id to act on.
pub const ACCOUNT_NOT_FOUND: &str = "ACCOUNT_NOT_FOUND";

/// Membership change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Invite,
    Kick,
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationAction::Invite => write!(f, "invite"),
            MutationAction::Kick => write!(f, "kick"),
        }
    }
}

/// One invite or kick that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialFailure {
    pub handle: IdentityHandle,
    pub action: MutationAction,
    pub error_code: String,
    pub cause: String,
}

/// Outcome of applying one channel's delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Handles successfully invited.
    pub invited: Vec<IdentityHandle>,
    /// Handles successfully kicked.
    pub kicked: Vec<IdentityHandle>,
    /// Per-handle failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PartialFailure>,
    /// Platform calls issued, successful or not.
    pub calls_made: usize,
}

impl ApplyReport {
    /// Whether every planned change went through.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Issues membership changes against the chat platform.
pub struct MutationApplier<'a> {
    platform: &'a dyn ChatPlatform,
    accounts: &'a AccountIndex,
}

impl<'a> MutationApplier<'a> {
    pub fn new(platform: &'a dyn ChatPlatform, accounts: &'a AccountIndex) -> Self {
        Self { platform, accounts }
    }

    /// Invite and kick the given handles on the snapshot's channel.
    ///
    /// Invite ids come from the account index. Kick ids come from the index
    /// too, falling back to the id the member list reported, so members
    /// whose account is missing from the index can still be removed.
    #[instrument(skip_all, fields(channel = %snapshot.channel.name))]
    pub async fn apply(
        &self,
        snapshot: &ChannelSnapshot,
        invite: &BTreeSet<IdentityHandle>,
        kick: &BTreeSet<IdentityHandle>,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();
        let channel = &snapshot.channel;

        for handle in invite {
            let Some(account) = self.accounts.get(handle) else {
                Self::record_unresolved(&mut report, handle, MutationAction::Invite);
                continue;
            };

            report.calls_made += 1;
            match self.platform.invite(channel, account).await {
                Ok(()) => {
                    info!(handle = %handle, "Invited");
                    report.invited.push(handle.clone());
                }
                Err(e) => {
                    warn!(handle = %handle, error = %e, "Invite failed");
                    report.failures.push(PartialFailure {
                        handle: handle.clone(),
                        action: MutationAction::Invite,
                        error_code: e.error_code().to_string(),
                        cause: e.to_string(),
                    });
                }
            }
        }

        for handle in kick {
            let account: Option<&AccountId> = self
                .accounts
                .get(handle)
                .or_else(|| snapshot.members.get(handle));

            let Some(account) = account else {
                Self::record_unresolved(&mut report, handle, MutationAction::Kick);
                continue;
            };

            report.calls_made += 1;
            match self.platform.kick(channel, account).await {
                Ok(()) => {
                    info!(handle = %handle, "Kicked");
                    report.kicked.push(handle.clone());
                }
                Err(e) => {
                    warn!(handle = %handle, error = %e, "Kick failed");
                    report.failures.push(PartialFailure {
                        handle: handle.clone(),
                        action: MutationAction::Kick,
                        error_code: e.error_code().to_string(),
                        cause: e.to_string(),
                    });
                }
            }
        }

        report
    }

    fn record_unresolved(report: &mut ApplyReport, handle: &IdentityHandle, action: MutationAction) {
        warn!(handle = %handle, action = %action, "No account id for handle, skipped");
        report.failures.push(PartialFailure {
            handle: handle.clone(),
            action,
            error_code: ACCOUNT_NOT_FOUND.to_string(),
            cause: format!("no account id known for '{handle}'"),
        });
    }
}
