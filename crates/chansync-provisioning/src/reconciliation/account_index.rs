//! Account index: handle to platform account id.
//!
//! Built once per run from the full account list; read-only afterwards.

use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

use chansync_connector::error::ConnectorResult;
use chansync_connector::traits::ChatPlatform;
use chansync_connector::types::{AccountId, AccountRecord, IdentityHandle};

use super::engine::KnownAccounts;

/// Lookup from normalised handle to account id.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    accounts: BTreeMap<IdentityHandle, AccountId>,
}

impl AccountIndex {
    /// List every account on the platform and index it.
    #[instrument(skip(platform), fields(platform = %platform.display_name()))]
    pub async fn build(platform: &dyn ChatPlatform) -> ConnectorResult<Self> {
        let accounts = platform.list_accounts().await?;
        let index = Self::from_records(accounts);
        info!(accounts = index.len(), "Account index built");
        Ok(index)
    }

    /// Index a list of account records.
    ///
    /// Usernames are normalised; when two accounts collapse to the same
    /// handle the first one wins.
    pub fn from_records(records: impl IntoIterator<Item = AccountRecord>) -> Self {
        let mut accounts = BTreeMap::new();

        for record in records {
            let Some(handle) = IdentityHandle::parse(&record.username) else {
                continue;
            };

            if let Some(existing) = accounts.get(&handle) {
                warn!(
                    handle = %handle,
                    kept = %existing,
                    ignored = %record.id,
                    "Duplicate account handle, keeping the first account"
                );
                continue;
            }

            accounts.insert(handle, record.id);
        }

        Self { accounts }
    }

    /// Account id for a handle.
    pub fn get(&self, handle: &IdentityHandle) -> Option<&AccountId> {
        self.accounts.get(handle)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl KnownAccounts for AccountIndex {
    fn is_known(&self, handle: &IdentityHandle) -> bool {
        self.accounts.contains_key(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, username: &str) -> AccountRecord {
        AccountRecord {
            id: AccountId::new(id),
            username: username.to_string(),
        }
    }

    #[test]
    fn test_index_normalises_usernames() {
        let index = AccountIndex::from_records(vec![record("u1", "Alice"), record("u2", "bob")]);

        let alice = IdentityHandle::parse("alice").unwrap();
        assert_eq!(index.get(&alice), Some(&AccountId::new("u1")));
        assert!(index.is_known(&alice));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_index_duplicate_keeps_first() {
        let index = AccountIndex::from_records(vec![record("u1", "Bob"), record("u2", "bob")]);

        let bob = IdentityHandle::parse("bob").unwrap();
        assert_eq!(index.get(&bob), Some(&AccountId::new("u1")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_index_skips_blank_usernames() {
        let index = AccountIndex::from_records(vec![record("u1", " ")]);
        assert!(index.is_empty());
    }
}
