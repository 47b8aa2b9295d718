//! Vaultier Wallet Core
//!
//! In-memory, multi-tenant wallet service: each user owns an independent
//! multi-currency balance, and callers invoke deposit, withdraw,
//! balance-query, and peer-to-peer transfer operations concurrently.
//!
//! # Architecture
//!
//! - **Actor per account**: one Tokio task owns each account's state; a
//!   bounded mailbox serializes every operation, so no locks cross accounts
//! - **Admission control**: inbound transfer credits are capacity-limited
//!   per account and rejected immediately once the limit is reached
//! - **Transient restart**: a crashed account actor is replaced with a
//!   fresh empty account under the same identity; normal stops are final
//!
//! # Invariants
//!
//! - Per-account serializability: requests are applied in acceptance order
//! - Balances never go negative; a rejected operation changes nothing
//! - Every admitted credit releases its admission slot exactly once
//! - A successful transfer conserves the total across both accounts
//!
//! State is intentionally volatile: it lives in memory for the process
//! lifetime, and a crash-restart of one account discards that account's
//! balances.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod admission;
pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod supervisor;
pub mod types;
pub mod wallet;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use types::{Currency, MinorUnits, TransferReceipt, UserId};
pub use wallet::Wallet;
