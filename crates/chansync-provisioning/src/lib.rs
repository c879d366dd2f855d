//! # Provisioning Engine
//!
//! Channel membership reconciliation for chansync.
//!
//! For each configured mapping the runner resolves a directory query,
//! looks up the target channel and its current members, computes the
//! invite/kick delta and (unless dry-run) applies it.
//!
//! ## Example
//!
//! ```ignore
//! use chansync_provisioning::{MappingDefinition, MappingRunner, RunOptions};
//!
//! let mappings = vec![
//!     MappingDefinition::new("(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)", "ops")
//!         .private()
//!         .applied(),
//! ];
//!
//! let report = MappingRunner::new(&directory, &platform)
//!     .with_options(RunOptions { force_dry_run: true, ..Default::default() })
//!     .run(&mappings)
//!     .await?;
//! ```

pub mod error;
pub mod mapping;
pub mod reconciliation;
pub mod runner;

pub use error::{MappingError, SyncError, SyncResult};
pub use mapping::{validate_mappings, MappingDefinition};
pub use reconciliation::{
    reconcile, AccountIndex, ApplyReport, MappingOutcome, MappingReport, PartialFailure,
    ReconciliationPlan, RunReport, RunStatistics,
};
pub use runner::{MappingRunner, RunOptions};
