//! # Reconciliation
//!
//! Computes and applies channel membership changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────────┐
//! │ DirectoryResolver│   │ MembershipSnapshot   │
//! │  (query→handles) │   │ Provider (channel,   │
//! └────────┬─────────┘   │  current members)    │
//!          │             └──────────┬───────────┘
//!          ▼                        ▼
//!        ┌──────────────────────────────┐     ┌──────────────┐
//!        │ reconcile (pure set algebra) │◄────│ AccountIndex │
//!        └──────────────┬───────────────┘     └──────────────┘
//!                       ▼
//!              ┌─────────────────┐
//!              │ MutationApplier │  (skipped on dry-run)
//!              └─────────────────┘
//! ```

pub mod account_index;
pub mod applier;
pub mod engine;
pub mod report;
pub mod snapshot;
pub mod statistics;

// Re-export main types
pub use account_index::AccountIndex;
pub use applier::{ApplyReport, MutationAction, MutationApplier, PartialFailure};
pub use engine::{reconcile, KnownAccounts, ReconciliationPlan};
pub use report::{MappingFailure, MappingOutcome, MappingReport, RunReport};
pub use snapshot::{ChannelSnapshot, MembershipSnapshotProvider};
pub use statistics::RunStatistics;
