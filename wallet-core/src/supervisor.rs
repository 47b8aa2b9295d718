//! Dynamic supervision of account actors
//!
//! The supervisor spawns account actors on demand, watches their join
//! handles, and replaces a crashed actor with a fresh empty account under
//! the same identity. An actor that stops normally is not restarted
//! (transient restart semantics).
//!
//! Restarting discards all balances the crashed actor held. That loss is
//! deliberate for an in-memory service and is surfaced in the logs rather
//! than hidden.

use crate::actor::{spawn_account_actor, AccountHandle};
use crate::directory::Directory;
use crate::types::UserId;
use crate::{Config, Error, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Restart bookkeeping
#[derive(Debug, Clone, Default)]
pub struct RestartStats {
    /// Total crash-restarts performed
    pub restarts: u64,

    /// Most recent restart time
    pub last_restart: Option<Instant>,
}

/// Supervisor owning account actor lifecycles
#[derive(Debug, Clone)]
pub struct AccountSupervisor {
    directory: Arc<Directory>,
    config: Arc<Config>,
    stats: Arc<RwLock<RestartStats>>,
}

impl AccountSupervisor {
    /// Create a supervisor over `directory`
    pub fn new(directory: Arc<Directory>, config: Arc<Config>) -> Self {
        Self {
            directory,
            config,
            stats: Arc::new(RwLock::new(RestartStats::default())),
        }
    }

    /// Start an actor for a new identity and register it.
    ///
    /// Exactly one of any number of concurrent calls for the same identity
    /// wins; the rest fail with `UserAlreadyExists`.
    pub fn start_account(&self, identity: &UserId) -> Result<AccountHandle> {
        let (handle, join) = spawn_account_actor(identity.clone(), &self.config);
        match self.directory.register(identity.clone(), handle.clone()) {
            Ok(()) => {
                self.watch(identity.clone(), join);
                tracing::info!(identity = %identity, "account started");
                Ok(handle)
            }
            Err(err) => {
                // Lost the registration race; retire the orphan actor.
                join.abort();
                Err(err)
            }
        }
    }

    /// Idempotent start: returns the existing handle when the identity is
    /// already registered, otherwise starts a fresh account.
    pub fn ensure_started(&self, identity: &UserId) -> Result<AccountHandle> {
        if let Some(handle) = self.directory.lookup(identity) {
            return Ok(handle);
        }
        match self.start_account(identity) {
            Ok(handle) => Ok(handle),
            Err(Error::UserAlreadyExists(_)) => self.directory.lookup(identity).ok_or_else(|| {
                Error::Concurrency("registration raced with account teardown".to_string())
            }),
            Err(err) => Err(err),
        }
    }

    /// Snapshot of restart bookkeeping
    pub fn restart_stats(&self) -> RestartStats {
        self.stats.read().clone()
    }

    /// Watch a running actor; restart on abnormal termination only.
    fn watch(&self, identity: UserId, join: JoinHandle<()>) {
        let supervisor = self.clone();
        tokio::spawn(async move {
            match join.await {
                Ok(()) => {
                    tracing::info!(identity = %identity, "account stopped normally");
                }
                Err(err) if err.is_panic() => {
                    tracing::error!(
                        identity = %identity,
                        "account crashed, restarting with empty state"
                    );
                    supervisor.restart(identity);
                }
                Err(_) => {
                    // Aborted: deliberate teardown, not a crash.
                    tracing::debug!(identity = %identity, "account aborted");
                }
            }
        });
    }

    /// Replace a crashed actor with a fresh one under the same identity.
    /// Balances from before the crash are discarded.
    fn restart(&self, identity: UserId) {
        let (handle, join) = spawn_account_actor(identity.clone(), &self.config);
        self.directory.replace(identity.clone(), handle);

        {
            let mut stats = self.stats.write();
            stats.restarts += 1;
            stats.last_restart = Some(Instant::now());
        }

        self.watch(identity, join);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;
    use std::time::Duration;

    fn supervisor() -> AccountSupervisor {
        AccountSupervisor::new(Arc::new(Directory::new()), Arc::new(Config::default()))
    }

    fn usd() -> Currency {
        Currency::parse("USD").unwrap()
    }

    #[tokio::test]
    async fn test_start_account_registers_handle() {
        let supervisor = supervisor();
        let alice = UserId::new("alice");

        let handle = supervisor.start_account(&alice).unwrap();
        assert_eq!(handle.deposit(usd(), 1_000).await.unwrap(), 1_000);
        assert!(supervisor.directory.lookup(&alice).is_some());
    }

    #[tokio::test]
    async fn test_start_account_twice_fails() {
        let supervisor = supervisor();
        let alice = UserId::new("alice");

        supervisor.start_account(&alice).unwrap();
        let err = supervisor.start_account(&alice).unwrap_err();
        assert_eq!(err, Error::UserAlreadyExists("alice".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_started_is_idempotent() {
        let supervisor = supervisor();
        let alice = UserId::new("alice");

        let first = supervisor.ensure_started(&alice).unwrap();
        first.deposit(usd(), 5_000).await.unwrap();

        // Second call must return the existing account, not a fresh one.
        let second = supervisor.ensure_started(&alice).unwrap();
        assert_eq!(second.balance(usd()).await.unwrap(), 5_000);
    }

    #[tokio::test]
    async fn test_crash_restarts_with_empty_account() {
        let supervisor = supervisor();
        let alice = UserId::new("alice");

        let handle = supervisor.start_account(&alice).unwrap();
        handle.deposit(usd(), 9_000).await.unwrap();

        // Simulate an abnormal termination of the account task.
        let crashed: JoinHandle<()> = tokio::spawn(async { panic!("account task died") });
        supervisor.watch(alice.clone(), crashed);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let stats = supervisor.restart_stats();
        assert_eq!(stats.restarts, 1);
        assert!(stats.last_restart.is_some());

        // The directory now serves a fresh, empty account.
        let replacement = supervisor.directory.lookup(&alice).unwrap();
        assert_eq!(replacement.balance(usd()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_normal_stop_is_not_restarted() {
        let supervisor = supervisor();
        let alice = UserId::new("alice");

        let handle = supervisor.start_account(&alice).unwrap();
        handle.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(supervisor.restart_stats().restarts, 0);
    }
}
