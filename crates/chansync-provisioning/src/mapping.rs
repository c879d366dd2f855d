//! Mapping definitions
//!
//! A mapping binds one directory query plus a static allow-list to one
//! channel. Mappings are loaded once, never mutated and processed in
//! declaration order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use chansync_connector::types::{ChannelPattern, IdentityHandle, MatchMode, Visibility};

use crate::error::{MappingError, SyncError};

/// One configured directory-to-channel rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDefinition {
    /// Label used in reports and by `--mapping`; defaults to the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Directory filter, e.g. `(memberOf=CN=Ops,OU=Groups,DC=acme,DC=com)`.
    pub ldap_query: String,

    /// Machine-readable channel name or pattern.
    pub channel: String,

    /// How `channel` is matched.
    #[serde(rename = "match", default)]
    pub match_mode: MatchMode,

    /// Target is a private group rather than a public channel.
    #[serde(default)]
    pub private: bool,

    /// Send the computed changes; when false the mapping is dry-run.
    #[serde(default)]
    pub apply: bool,

    /// Handles that are always desired members.
    #[serde(default)]
    pub additional_users: Vec<IdentityHandle>,
}

impl MappingDefinition {
    /// Create a dry-run mapping for a public channel.
    pub fn new(ldap_query: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            name: None,
            ldap_query: ldap_query.into(),
            channel: channel.into(),
            match_mode: MatchMode::default(),
            private: false,
            apply: false,
            additional_users: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    #[must_use]
    pub fn exact(mut self) -> Self {
        self.match_mode = MatchMode::Exact;
        self
    }

    #[must_use]
    pub fn applied(mut self) -> Self {
        self.apply = true;
        self
    }

    #[must_use]
    pub fn with_additional_user(mut self, handle: IdentityHandle) -> Self {
        self.additional_users.push(handle);
        self
    }

    /// Label for reports.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.channel)
    }

    pub fn pattern(&self) -> ChannelPattern {
        ChannelPattern {
            pattern: self.channel.clone(),
            mode: self.match_mode,
        }
    }

    pub fn visibility(&self) -> Visibility {
        Visibility::from_private_flag(self.private)
    }

    /// Static allow-list as a set.
    pub fn static_handles(&self) -> BTreeSet<IdentityHandle> {
        self.additional_users.iter().cloned().collect()
    }

    /// Check that the mapping can be run.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.ldap_query.trim().is_empty() {
            return Err(MappingError::invalid(self.label(), "ldap_query is empty"));
        }

        self.pattern()
            .validate()
            .map_err(|message| MappingError::invalid(self.label(), message))
    }
}

/// Reject problems that concern the run as a whole: an empty mapping list
/// and duplicate labels.
///
/// A single mapping's own settings are checked when that mapping runs, so
/// one misconfigured mapping fails alone. Several mappings may target the
/// same channel; they are not reconciled against each other.
pub fn validate_mappings(mappings: &[MappingDefinition]) -> Result<(), SyncError> {
    if mappings.is_empty() {
        return Err(SyncError::configuration("no mappings configured"));
    }

    let mut labels = HashSet::new();

    for mapping in mappings {
        if !labels.insert(mapping.label()) {
            return Err(SyncError::configuration(format!(
                "duplicate mapping label '{}'",
                mapping.label()
            )));
        }
    }

    Ok(())
}
