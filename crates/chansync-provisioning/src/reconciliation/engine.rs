//! Membership reconciliation.
//!
//! Pure set arithmetic over already-resolved handles. No I/O happens here,
//! so the computation cannot fail.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use chansync_connector::types::IdentityHandle;

/// Handles that have an account on the chat platform.
pub trait KnownAccounts {
    fn is_known(&self, handle: &IdentityHandle) -> bool;
}

impl KnownAccounts for BTreeSet<IdentityHandle> {
    fn is_known(&self, handle: &IdentityHandle) -> bool {
        self.contains(handle)
    }
}

impl KnownAccounts for HashSet<IdentityHandle> {
    fn is_known(&self, handle: &IdentityHandle) -> bool {
        self.contains(handle)
    }
}

/// Result of reconciling one channel.
///
/// `invite` and `kick` are disjoint, and `unmatched` never overlaps
/// `desired_valid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Desired handles that have a platform account.
    pub desired_valid: BTreeSet<IdentityHandle>,
    /// Desired handles without a platform account. Reported, never acted on.
    pub unmatched: BTreeSet<IdentityHandle>,
    /// Handles to add to the channel.
    pub invite: BTreeSet<IdentityHandle>,
    /// Handles to remove from the channel.
    pub kick: BTreeSet<IdentityHandle>,
}

impl ReconciliationPlan {
    /// Whether the channel already matches the desired membership.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.invite.is_empty() && self.kick.is_empty()
    }
}

/// Compute the invite/kick delta for one channel.
///
/// A current member who is desired but has no known account is kicked:
/// only valid desired members are kept.
pub fn reconcile<K: KnownAccounts + ?Sized>(
    directory_handles: &BTreeSet<IdentityHandle>,
    static_handles: &BTreeSet<IdentityHandle>,
    known_accounts: &K,
    current_members: &BTreeSet<IdentityHandle>,
) -> ReconciliationPlan {
    let (desired_valid, unmatched): (BTreeSet<_>, BTreeSet<_>) = directory_handles
        .union(static_handles)
        .cloned()
        .partition(|handle| known_accounts.is_known(handle));

    let invite = desired_valid.difference(current_members).cloned().collect();
    let kick = current_members.difference(&desired_valid).cloned().collect();

    ReconciliationPlan {
        desired_valid,
        unmatched,
        invite,
        kick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(handles: &[&str]) -> BTreeSet<IdentityHandle> {
        handles
            .iter()
            .map(|h| IdentityHandle::parse(h).unwrap())
            .collect()
    }

    #[test]
    fn test_reconcile_invites_and_kicks() {
        let plan = reconcile(
            &set(&["alice", "bob"]),
            &set(&["admin"]),
            &set(&["alice", "bob", "admin", "carol"]),
            &set(&["bob", "carol"]),
        );

        assert!(plan.unmatched.is_empty());
        assert_eq!(plan.desired_valid, set(&["alice", "bob", "admin"]));
        assert_eq!(plan.invite, set(&["alice", "admin"]));
        assert_eq!(plan.kick, set(&["carol"]));
    }

    #[test]
    fn test_reconcile_member_without_account_is_kicked() {
        let plan = reconcile(
            &set(&["alice", "bob"]),
            &set(&["admin"]),
            &set(&["alice", "admin", "carol"]),
            &set(&["bob", "carol"]),
        );

        assert_eq!(plan.unmatched, set(&["bob"]));
        assert_eq!(plan.desired_valid, set(&["alice", "admin"]));
        assert_eq!(plan.invite, set(&["alice", "admin"]));
        assert_eq!(plan.kick, set(&["bob", "carol"]));
    }

    #[test]
    fn test_reconcile_in_sync_is_noop() {
        let plan = reconcile(
            &set(&["alice"]),
            &set(&["admin"]),
            &set(&["alice", "admin"]),
            &set(&["alice", "admin"]),
        );
        assert!(plan.is_noop());
    }

    #[test]
    fn test_reconcile_empty_directory_kicks_everyone_not_static() {
        let plan = reconcile(
            &BTreeSet::new(),
            &set(&["admin"]),
            &set(&["alice", "admin"]),
            &set(&["alice", "admin"]),
        );
        assert!(plan.invite.is_empty());
        assert_eq!(plan.kick, set(&["alice"]));
    }

    #[test]
    fn test_reconcile_overlapping_static_and_directory() {
        let plan = reconcile(
            &set(&["alice"]),
            &set(&["alice"]),
            &set(&["alice"]),
            &BTreeSet::new(),
        );
        assert_eq!(plan.invite, set(&["alice"]));
    }

    #[test]
    fn test_reconcile_with_hash_set_accounts() {
        let known: HashSet<IdentityHandle> = set(&["alice"]).into_iter().collect();
        let plan = reconcile(&set(&["alice", "zed"]), &BTreeSet::new(), &known, &BTreeSet::new());
        assert_eq!(plan.unmatched, set(&["zed"]));
        assert_eq!(plan.invite, set(&["alice"]));
    }
}
