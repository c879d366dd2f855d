//! Channel membership snapshots.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

use chansync_connector::error::LookupError;
use chansync_connector::traits::ChatPlatform;
use chansync_connector::types::{AccountId, ChannelPattern, ChannelRef, IdentityHandle, Visibility};

/// Resolved channel plus its complete current membership.
#[derive(Debug, Clone)]
pub struct ChannelSnapshot {
    pub channel: ChannelRef,
    /// Current members by handle, with the account id the platform reported.
    pub members: BTreeMap<IdentityHandle, AccountId>,
    /// Names of every channel the pattern matched when it matched more than one.
    pub ambiguous_matches: Vec<String>,
}

impl ChannelSnapshot {
    pub fn member_handles(&self) -> BTreeSet<IdentityHandle> {
        self.members.keys().cloned().collect()
    }
}

/// Looks up a channel by pattern and reads its members.
pub struct MembershipSnapshotProvider<'a> {
    platform: &'a dyn ChatPlatform,
}

impl<'a> MembershipSnapshotProvider<'a> {
    pub fn new(platform: &'a dyn ChatPlatform) -> Self {
        Self { platform }
    }

    /// Resolve the channel and read its membership.
    ///
    /// Zero matches is `ChannelNotFound`. Several matches select the first
    /// in the platform's order and are flagged, not disambiguated.
    #[instrument(skip(self), fields(pattern = %pattern, visibility = %visibility))]
    pub async fn snapshot(
        &self,
        pattern: &ChannelPattern,
        visibility: Visibility,
    ) -> Result<ChannelSnapshot, LookupError> {
        let candidates = self.platform.find_channels(pattern, visibility).await?;

        let Some(first) = candidates.first() else {
            return Err(LookupError::ChannelNotFound {
                pattern: pattern.clone(),
                visibility,
            });
        };

        let ambiguous_matches: Vec<String> = if candidates.len() > 1 {
            candidates.iter().map(|c| c.name.clone()).collect()
        } else {
            Vec::new()
        };

        if !ambiguous_matches.is_empty() {
            warn!(
                candidates = ?ambiguous_matches,
                selected = %first.name,
                "Channel pattern matched more than one channel, using the first"
            );
        }

        let channel = ChannelRef {
            id: first.id.clone(),
            name: first.name.clone(),
            visibility,
        };

        info!(channel = %channel.name, channel_id = %channel.id, "Resolved channel");

        let mut members = BTreeMap::new();
        for member in self.platform.list_members(&channel).await? {
            match IdentityHandle::parse(&member.username) {
                Some(handle) => {
                    members.entry(handle).or_insert(member.id);
                }
                None => debug!(account = %member.id, "Member without a username ignored"),
            }
        }

        debug!(members = members.len(), "Read channel membership");

        Ok(ChannelSnapshot {
            channel,
            members,
            ambiguous_matches,
        })
    }
}
