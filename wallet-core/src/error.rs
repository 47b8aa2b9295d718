//! Error types for the wallet service

use thiserror::Error;

/// Result type for wallet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wallet errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Identity already registered
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// Identity not registered
    #[error("user does not exist: {0}")]
    UserDoesNotExist(String),

    /// Transfer sender not registered
    #[error("sender does not exist: {0}")]
    SenderDoesNotExist(String),

    /// Transfer receiver not registered
    #[error("receiver does not exist: {0}")]
    ReceiverDoesNotExist(String),

    /// Balance below the requested amount
    #[error("not enough money")]
    NotEnoughMoney,

    /// Inbound credit limit reached for the account
    #[error("too many requests to user: {0}")]
    TooManyRequestsToUser(String),

    /// Inbound credit limit reached on the receiving side of a transfer
    #[error("too many requests to receiver: {0}")]
    TooManyRequestsToReceiver(String),

    /// Credit confirmation did not arrive within the transfer deadline
    #[error("transfer timed out")]
    TransferTimeout,

    /// Transfer failed before the credit was applied
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Balance arithmetic exceeded the representable range
    #[error("amount overflow")]
    AmountOverflow,

    /// Malformed identity, currency, or amount
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
