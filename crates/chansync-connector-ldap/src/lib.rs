//! # LDAP Directory Resolver
//!
//! Resolves LDAP filters into sets of identity handles for chansync.
//!
//! ## Features
//!
//! - LDAP and LDAPS connections, with optional STARTTLS
//! - Simple bind with a service account, established once per run
//! - Subtree searches paged with the simple-paged-results control
//! - Handle attribute is configurable (`sAMAccountName` for AD, `uid` for OpenLDAP)
//!
//! ## Example
//!
//! ```ignore
//! use chansync_connector::prelude::*;
//! use chansync_connector_ldap::{LdapConfig, LdapDirectory};
//!
//! let config = LdapConfig::new(
//!     "ldap.acme.com",
//!     "OU=Users,DC=acme,DC=com",
//!     "CN=LdapAccess,OU=FunctionalAccounts,DC=acme,DC=com",
//! )
//! .with_password("secret")
//! .with_ssl();
//!
//! let directory = LdapDirectory::new(config)?;
//! let handles = directory
//!     .resolve("(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)")
//!     .await?;
//! ```

pub mod config;
pub mod connector;

pub use config::LdapConfig;
pub use connector::LdapDirectory;
