//! Collaborator traits
//!
//! The reconciliation core only ever sees these traits, so the LDAP and
//! Rocket.Chat connectors can be swapped for test doubles.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::{ConnectorResult, DirectoryError, LookupError};
use crate::types::{
    AccountId, AccountRecord, ChannelPattern, ChannelRecord, ChannelRef, ConnectorType,
    IdentityHandle, MemberRecord, Visibility,
};

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Get the type of this connector.
    fn connector_type(&self) -> ConnectorType;

    /// Get the display name for this connector instance.
    fn display_name(&self) -> &str;

    /// Test the connection to the target system.
    async fn test_connection(&self) -> ConnectorResult<()>;

    /// Release the connection/session at the end of a run.
    async fn dispose(&self) -> ConnectorResult<()>;
}

/// Resolves a directory query into the set of identity handles it matches.
#[async_trait]
pub trait DirectoryResolver: Connector {
    /// Run exactly one search under the process-wide base scope.
    ///
    /// Duplicate entries collapse. An empty set is a legitimate answer; any
    /// failure is an error and must not be read as "nobody".
    async fn resolve(&self, query: &str) -> Result<BTreeSet<IdentityHandle>, DirectoryError>;
}

/// Operations the sync needs from a chat platform.
///
/// Every listing is exhaustive: implementations page until the platform's
/// reported total is reached and fail rather than return a partial list.
#[async_trait]
pub trait ChatPlatform: Connector {
    /// List every account on the platform.
    async fn list_accounts(&self) -> ConnectorResult<Vec<AccountRecord>>;

    /// List channels of the given visibility whose name matches `pattern`,
    /// in the platform's native order.
    async fn find_channels(
        &self,
        pattern: &ChannelPattern,
        visibility: Visibility,
    ) -> ConnectorResult<Vec<ChannelRecord>>;

    /// List every member of a channel.
    async fn list_members(&self, channel: &ChannelRef) -> Result<Vec<MemberRecord>, LookupError>;

    /// Add an account to a channel.
    async fn invite(&self, channel: &ChannelRef, account: &AccountId) -> ConnectorResult<()>;

    /// Remove an account from a channel.
    async fn kick(&self, channel: &ChannelRef, account: &AccountId) -> ConnectorResult<()>;
}
