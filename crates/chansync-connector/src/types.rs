//! Shared value types
//!
//! Identity handles, opaque platform identifiers, channel references and the
//! typed records every chat-platform connector returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Type of connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    /// LDAP/Active Directory directory service
    Ldap,
    /// Rocket.Chat REST API
    RocketChat,
}

impl ConnectorType {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorType::Ldap => "ldap",
            ConnectorType::RocketChat => "rocketchat",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person's username, shared by the directory and the chat platform.
///
/// Only constructible through normalisation (trimmed, lower-cased), so two
/// handles are equal exactly when they name the same person.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct IdentityHandle(String);

impl IdentityHandle {
    /// Normalise a raw username. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    /// Get the normalised handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for IdentityHandle {
    type Err = ParseHandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(ParseHandleError)
    }
}

impl<'de> Deserialize<'de> for IdentityHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("identity handle is blank"))
    }
}

/// Error parsing a blank identity handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("identity handle is blank")]
pub struct ParseHandleError;

/// Opaque platform-internal account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque platform-internal channel (room) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visibility of a channel.
///
/// Public channels and private groups are different entity kinds on the
/// platform (different API calls) with identical reconciliation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Map the configuration's `private` flag.
    #[must_use]
    pub fn from_private_flag(private: bool) -> Self {
        if private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// A resolved channel: identifier plus the visibility it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
    pub visibility: Visibility,
}

impl ChannelRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            id: ChannelId::new(id),
            name: name.into(),
            visibility,
        }
    }
}

/// How a mapping's channel string is matched against channel names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Unanchored regular expression on the machine-readable name.
    #[default]
    Regex,
    /// Literal name, escaped and anchored.
    Exact,
}

/// Channel name pattern of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelPattern {
    pub pattern: String,
    #[serde(default)]
    pub mode: MatchMode,
}

impl ChannelPattern {
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            mode: MatchMode::Regex,
        }
    }

    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            pattern: name.into(),
            mode: MatchMode::Exact,
        }
    }

    /// The regular expression sent to the platform.
    #[must_use]
    pub fn to_regex(&self) -> String {
        match self.mode {
            MatchMode::Regex => self.pattern.clone(),
            MatchMode::Exact => format!("^{}$", regex::escape(&self.pattern)),
        }
    }

    /// Reject empty patterns.
    ///
    /// Regex syntax is checked by the platform's own regex engine, not
    /// here; a pattern it refuses fails the lookup for that mapping.
    pub fn validate(&self) -> Result<(), String> {
        if self.pattern.trim().is_empty() {
            return Err("channel pattern is empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for ChannelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// One account of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub username: String,
}

/// One channel returned by a channel lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub name: String,
}

/// One member of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: AccountId,
    pub username: String,
}
