//! Core types for the wallet service
//!
//! Money crosses the public boundary as `rust_decimal::Decimal` and is
//! converted exactly once to integer minor units (cents). All internal
//! arithmetic works on the integer representation, so repeated additions
//! never accumulate rounding drift.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Decimal places carried by minor units.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Integer money amount in minor units (cents).
pub type MinorUnits = i64;

/// User identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new user identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized uppercase currency code (e.g. "USD")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code.
    ///
    /// Codes are case-insensitive at the boundary: 1 to 8 ASCII letters,
    /// stored uppercase.
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.is_empty() || code.len() > 8 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidArgument(format!(
                "invalid currency code: {code:?}"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Normalized code
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert a boundary decimal amount to minor units.
///
/// Rounds half away from zero at two decimal places; this is the single
/// rounding point of the system. Fails on non-positive amounts and on
/// amounts outside the representable range.
pub fn to_minor_units(amount: Decimal) -> Result<MinorUnits> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidArgument(format!(
            "amount must be positive: {amount}"
        )));
    }

    let rounded =
        amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let minor = rounded
        .checked_mul(Decimal::from(100_i64))
        .and_then(|scaled| scaled.to_i64())
        .ok_or_else(|| Error::InvalidArgument(format!("amount out of range: {amount}")))?;

    if minor <= 0 {
        return Err(Error::InvalidArgument(format!(
            "amount rounds to zero: {amount}"
        )));
    }
    Ok(minor)
}

/// Convert minor units back to a boundary decimal.
pub fn from_minor_units(amount: MinorUnits) -> Decimal {
    Decimal::new(amount, MINOR_UNIT_SCALE)
}

/// Balances observed by a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Sender balance after the debit
    pub sender_balance: MinorUnits,

    /// Receiver balance after the credit
    pub receiver_balance: MinorUnits,
}

/// In-flight transfer context held by the sending actor while the credit
/// handshake is outstanding. Never persisted; dropped as soon as the
/// transfer resolves.
#[derive(Debug, Clone)]
pub struct PendingTransfer {
    /// Unique transfer ID (UUIDv7 for time-ordering)
    pub transfer_id: Uuid,

    /// Sending account
    pub from: UserId,

    /// Receiving account
    pub to: UserId,

    /// Transfer currency
    pub currency: Currency,

    /// Amount in minor units
    pub amount: MinorUnits,

    /// When the debit was applied
    pub started_at: DateTime<Utc>,

    /// How long the sender waits for the credit confirmation
    pub deadline: Duration,
}
