//! Process-wide directory of account handles
//!
//! The only state shared across account executions: a concurrent map from
//! user identity to actor handle. Registration is atomic create-if-absent;
//! lookup never blocks and never serializes through any single account.

use crate::actor::AccountHandle;
use crate::types::UserId;
use crate::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Identity → account handle registry
#[derive(Debug, Default)]
pub struct Directory {
    accounts: DashMap<UserId, AccountHandle>,
}

impl Directory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic create-if-absent.
    ///
    /// Exactly one of any set of concurrent registrations for the same
    /// identity succeeds; the rest fail with `UserAlreadyExists`.
    pub fn register(&self, identity: UserId, handle: AccountHandle) -> Result<()> {
        match self.accounts.entry(identity) {
            Entry::Occupied(occupied) => {
                Err(Error::UserAlreadyExists(occupied.key().as_str().to_string()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(handle);
                Ok(())
            }
        }
    }

    /// Non-blocking lookup
    pub fn lookup(&self, identity: &UserId) -> Option<AccountHandle> {
        self.accounts.get(identity).map(|entry| entry.value().clone())
    }

    /// Swap in the replacement handle for a restarted account.
    ///
    /// Supervisor use only; public registration never updates an entry.
    pub(crate) fn replace(&self, identity: UserId, handle: AccountHandle) {
        self.accounts.insert(identity, handle);
    }

    /// Registered account count
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no accounts are registered
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Snapshot of all live handles
    pub(crate) fn handles(&self) -> Vec<AccountHandle> {
        self.accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
