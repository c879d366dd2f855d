//! # Connector Framework
//!
//! Core abstractions shared by the chansync directory and chat-platform
//! connectors.
//!
//! ## Architecture
//!
//! - [`Connector`] - Base trait all connectors implement
//! - [`DirectoryResolver`] - Resolve a directory query into identity handles
//! - [`ChatPlatform`] - List accounts, channels and members; invite and kick
//!
//! ## Example
//!
//! ```ignore
//! use chansync_connector::prelude::*;
//!
//! let handles = directory.resolve("(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)").await?;
//! let channels = platform
//!     .find_channels(&ChannelPattern::exact("ops"), Visibility::Private)
//!     .await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`types`] - Identity handles, identifiers, channel references, records
//! - [`error`] - Error types with transient/permanent classification
//! - [`traits`] - Collaborator traits
//! - [`config`] - Configuration trait and shared settings

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ConnectionSettings, ConnectorConfig, TlsConfig, REDACTED};
    pub use crate::error::{ConnectorError, ConnectorResult, DirectoryError, LookupError};
    pub use crate::traits::{ChatPlatform, Connector, DirectoryResolver};
    pub use crate::types::{
        AccountId, AccountRecord, ChannelId, ChannelPattern, ChannelRecord, ChannelRef,
        ConnectorType, IdentityHandle, MatchMode, MemberRecord, Visibility,
    };
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _ct = ConnectorType::Ldap;
        let _handle = IdentityHandle::parse("alice");
        let _pattern = ChannelPattern::exact("ops");
        let _channel = ChannelRef::new("r1", "ops", Visibility::Private);
        let _settings = ConnectionSettings::default();
    }
}
