//! Main wallet orchestration layer
//!
//! This module ties the directory, supervisor, and account actors into the
//! public in-process API. It is the boundary where decimal amounts become
//! integer minor units and currency codes are normalized; everything past
//! it works on the integer representation.
//!
//! # Example
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use wallet_core::{Config, Wallet};
//!
//! #[tokio::main]
//! async fn main() -> wallet_core::Result<()> {
//!     let wallet = Wallet::new(Config::default());
//!
//!     wallet.create_user("alice")?;
//!     wallet.create_user("bob")?;
//!
//!     wallet.deposit("alice", Decimal::new(10_000, 2), "USD").await?;
//!     let (from, to) = wallet.send("alice", "bob", Decimal::new(5_000, 2), "USD").await?;
//!     assert_eq!(from, to);
//!
//!     Ok(())
//! }
//! ```

use crate::actor::AccountHandle;
use crate::directory::Directory;
use crate::supervisor::{AccountSupervisor, RestartStats};
use crate::types::{self, Currency, UserId};
use crate::{Config, Error, Result};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Main wallet service interface
#[derive(Debug)]
pub struct Wallet {
    /// Identity → handle registry shared with the supervisor
    directory: Arc<Directory>,

    /// Account lifecycle management
    supervisor: AccountSupervisor,

    /// Configuration
    config: Arc<Config>,
}

impl Wallet {
    /// Create a wallet service with the given configuration
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let directory = Arc::new(Directory::new());
        let supervisor = AccountSupervisor::new(directory.clone(), config.clone());

        Self {
            directory,
            supervisor,
            config,
        }
    }

    /// Register a new user with an empty account.
    ///
    /// Exactly one of any number of concurrent registrations for the same
    /// identity succeeds.
    pub fn create_user(&self, identity: &str) -> Result<()> {
        let identity = parse_identity(identity)?;
        self.supervisor.start_account(&identity)?;
        tracing::info!(identity = %identity, "user created");
        Ok(())
    }

    /// Deposit `amount` of `currency` into the user's account.
    ///
    /// Returns the new balance. Deposits from the account's own caller are
    /// not admission-limited and always succeed once the user exists.
    pub async fn deposit(&self, identity: &str, amount: Decimal, currency: &str) -> Result<Decimal> {
        let identity = parse_identity(identity)?;
        let currency = Currency::parse(currency)?;
        let minor = types::to_minor_units(amount)?;

        let handle = self.resolve(&identity)?;
        let balance = handle.deposit(currency, minor).await?;
        Ok(types::from_minor_units(balance))
    }

    /// Withdraw `amount` of `currency` from the user's account.
    ///
    /// Fails with `NotEnoughMoney` when the balance is below `amount`; the
    /// balance is unchanged on failure.
    pub async fn withdraw(
        &self,
        identity: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<Decimal> {
        let identity = parse_identity(identity)?;
        let currency = Currency::parse(currency)?;
        let minor = types::to_minor_units(amount)?;

        let handle = self.resolve(&identity)?;
        let balance = handle.withdraw(currency, minor).await?;
        Ok(types::from_minor_units(balance))
    }

    /// Current balance of `currency` for the user; 0.00 when the currency
    /// has never been touched. Never creates an entry.
    pub async fn get_balance(&self, identity: &str, currency: &str) -> Result<Decimal> {
        let identity = parse_identity(identity)?;
        let currency = Currency::parse(currency)?;

        let handle = self.resolve(&identity)?;
        let balance = handle.balance(currency).await?;
        Ok(types::from_minor_units(balance))
    }

    /// Transfer `amount` of `currency` from one user to another.
    ///
    /// Returns both post-transfer balances `(from_balance, to_balance)`.
    pub async fn send(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<(Decimal, Decimal)> {
        let from_id = parse_identity(from)?;
        let to_id = parse_identity(to)?;
        if from_id == to_id {
            return Err(Error::InvalidArgument(
                "sender and receiver must differ".to_string(),
            ));
        }
        let currency = Currency::parse(currency)?;
        let minor = types::to_minor_units(amount)?;

        let sender = self
            .directory
            .lookup(&from_id)
            .ok_or_else(|| Error::SenderDoesNotExist(from_id.as_str().to_string()))?;
        let receiver = self
            .directory
            .lookup(&to_id)
            .ok_or_else(|| Error::ReceiverDoesNotExist(to_id.as_str().to_string()))?;

        let receipt = sender
            .transfer_out(receiver, currency, minor, self.config.transfer.deadline())
            .await?;

        Ok((
            types::from_minor_units(receipt.sender_balance),
            types::from_minor_units(receipt.receiver_balance),
        ))
    }

    /// Credits admitted against a user but not yet released
    pub fn in_flight_credits(&self, identity: &str) -> Result<usize> {
        let identity = parse_identity(identity)?;
        Ok(self.resolve(&identity)?.in_flight())
    }

    /// Restart statistics from the supervisor
    pub fn restart_stats(&self) -> RestartStats {
        self.supervisor.restart_stats()
    }

    /// Registered user count
    pub fn user_count(&self) -> usize {
        self.directory.len()
    }

    /// Stop all account actors normally
    pub async fn shutdown(self) -> Result<()> {
        for handle in self.directory.handles() {
            // A closed mailbox means the account is already gone.
            let _ = handle.shutdown().await;
        }
        Ok(())
    }

    fn resolve(&self, identity: &UserId) -> Result<AccountHandle> {
        self.directory
            .lookup(identity)
            .ok_or_else(|| Error::UserDoesNotExist(identity.as_str().to_string()))
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn parse_identity(identity: &str) -> Result<UserId> {
    if identity.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "identity must be a non-empty string".to_string(),
        ));
    }
    Ok(UserId::new(identity))
}
