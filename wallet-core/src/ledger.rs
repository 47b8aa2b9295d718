//! Per-account multi-currency ledger
//!
//! Pure, synchronous state owned by exactly one account actor. Amounts are
//! integer minor units. A failed operation leaves the ledger untouched: no
//! entry is created, no balance changes, and arithmetic never wraps.

use crate::types::{Currency, MinorUnits};
use crate::{Error, Result};
use std::collections::HashMap;

/// Multi-currency balances for a single account
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: HashMap<Currency, MinorUnits>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `currency`, creating the entry at zero if absent.
    pub fn deposit(&mut self, currency: &Currency, amount: MinorUnits) -> Result<MinorUnits> {
        let updated = self
            .balance(currency)
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        self.entries.insert(currency.clone(), updated);
        Ok(updated)
    }

    /// Remove `amount` from `currency`.
    ///
    /// Fails with `NotEnoughMoney` when the balance is below `amount`; the
    /// entry is unchanged on failure.
    pub fn withdraw(&mut self, currency: &Currency, amount: MinorUnits) -> Result<MinorUnits> {
        let current = self.balance(currency);
        if current < amount {
            return Err(Error::NotEnoughMoney);
        }
        let updated = current - amount;
        self.entries.insert(currency.clone(), updated);
        Ok(updated)
    }

    /// Current balance for `currency`; 0 when the currency has never been
    /// touched. Read-only: never creates an entry.
    pub fn balance(&self, currency: &Currency) -> MinorUnits {
        self.entries.get(currency).copied().unwrap_or(0)
    }

    /// Number of currencies with an entry
    pub fn currency_count(&self) -> usize {
        self.entries.len()
    }
}
