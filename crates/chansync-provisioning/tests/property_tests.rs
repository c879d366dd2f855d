//! Property-based tests for membership reconciliation.
//!
//! Handles are drawn from a small alphabet so that directory results,
//! static users, known accounts and current members overlap often.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use chansync_connector::types::IdentityHandle;
use chansync_provisioning::reconcile;

/// Generates a handle from a four-letter alphabet.
fn arb_handle() -> impl Strategy<Value = IdentityHandle> {
    "[a-d]{1,2}".prop_map(|s| IdentityHandle::parse(&s).unwrap())
}

/// Generates a small set of handles.
fn arb_handles() -> impl Strategy<Value = BTreeSet<IdentityHandle>> {
    prop::collection::btree_set(arb_handle(), 0..8)
}

/// Generates (directory, static, known, current).
fn arb_inputs() -> impl Strategy<
    Value = (
        BTreeSet<IdentityHandle>,
        BTreeSet<IdentityHandle>,
        BTreeSet<IdentityHandle>,
        BTreeSet<IdentityHandle>,
    ),
> {
    (arb_handles(), arb_handles(), arb_handles(), arb_handles())
}

proptest! {
    #[test]
    fn invite_and_kick_are_disjoint((directory, statics, known, current) in arb_inputs()) {
        let plan = reconcile(&directory, &statics, &known, &current);

        prop_assert!(plan.invite.is_disjoint(&plan.kick));
        prop_assert!(plan.unmatched.is_disjoint(&plan.desired_valid));
    }

    #[test]
    fn plan_partitions_desired((directory, statics, known, current) in arb_inputs()) {
        let plan = reconcile(&directory, &statics, &known, &current);

        let desired: BTreeSet<_> = directory.union(&statics).cloned().collect();
        let partition: BTreeSet<_> = plan.desired_valid.union(&plan.unmatched).cloned().collect();
        prop_assert_eq!(partition, desired);
        prop_assert!(plan.desired_valid.iter().all(|h| known.contains(h)));
        prop_assert!(plan.unmatched.iter().all(|h| !known.contains(h)));
    }

    #[test]
    fn applying_the_plan_converges((directory, statics, known, current) in arb_inputs()) {
        let plan = reconcile(&directory, &statics, &known, &current);

        let after: BTreeSet<_> = current
            .difference(&plan.kick)
            .cloned()
            .chain(plan.invite.iter().cloned())
            .collect();
        prop_assert_eq!(&after, &plan.desired_valid);

        let second = reconcile(&directory, &statics, &known, &after);
        prop_assert!(second.is_noop());
    }

    #[test]
    fn reconcile_is_deterministic((directory, statics, known, current) in arb_inputs()) {
        let first = reconcile(&directory, &statics, &known, &current);
        let second = reconcile(&directory, &statics, &known, &current);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn unmatched_handles_are_never_invited((directory, statics, known, current) in arb_inputs()) {
        let plan = reconcile(&directory, &statics, &known, &current);

        prop_assert!(plan.unmatched.is_disjoint(&plan.invite));
        for handle in plan.unmatched.intersection(&plan.kick) {
            prop_assert!(current.contains(handle));
        }
    }

    #[test]
    fn invites_exclude_current_and_kicks_are_current((directory, statics, known, current) in arb_inputs()) {
        let plan = reconcile(&directory, &statics, &known, &current);

        prop_assert!(plan.invite.is_disjoint(&current));
        prop_assert!(plan.kick.is_subset(&current));
        prop_assert_eq!(
            plan.invite.len() + current.len() - plan.kick.len(),
            plan.desired_valid.len()
        );
    }

    #[test]
    fn adding_static_users_never_adds_kicks(
        (directory, statics, known, current) in arb_inputs(),
        extra in arb_handles(),
    ) {
        let base = reconcile(&directory, &statics, &known, &current);

        let widened: BTreeSet<_> = statics.union(&extra).cloned().collect();
        let plan = reconcile(&directory, &widened, &known, &current);

        prop_assert!(plan.kick.is_subset(&base.kick));
        prop_assert!(base.invite.is_subset(&plan.invite));
    }

    #[test]
    fn empty_desired_kicks_everyone(current in arb_handles(), known in arb_handles()) {
        let empty = BTreeSet::new();
        let plan = reconcile(&empty, &empty, &known, &current);

        prop_assert!(plan.invite.is_empty());
        prop_assert_eq!(plan.kick, current);
    }
}
