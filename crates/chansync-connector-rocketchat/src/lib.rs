//! # Rocket.Chat Connector
//!
//! Rocket.Chat REST client for chansync.
//!
//! Lists accounts, channels and channel members, and invites or kicks
//! members of public channels and private groups.
//!
//! ## Features
//!
//! - Username/password login (session released on dispose) or personal access tokens
//! - Exhaustive `count`/`offset` pagination up to the reported `total`
//! - Channel lookup by regex or exact name, embedded as a JSON query
//! - Typed response envelopes; `success: false` is always an error
//!
//! ## Example
//!
//! ```ignore
//! use chansync_connector::prelude::*;
//! use chansync_connector_rocketchat::{RocketChatAuth, RocketChatClient, RocketChatConfig};
//!
//! let config = RocketChatConfig::new(
//!     "https://chat.acme.com",
//!     RocketChatAuth::password("sync-bot", "secret"),
//! );
//!
//! let client = RocketChatClient::new(config)?;
//! let channels = client
//!     .find_channels(&ChannelPattern::exact("ops"), Visibility::Private)
//!     .await?;
//! ```

pub mod config;
pub mod connector;
pub mod models;

// Re-exports
pub use config::{RocketChatAuth, RocketChatConfig};
pub use connector::RocketChatClient;
