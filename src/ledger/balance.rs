// Balance Ledger - fungible governance balances keyed by account

use crate::identity::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: u64, required: u64 },
}

/// Governance token balances
///
/// The whole supply is minted once, at construction, to a single holder.
/// Afterwards balances only move between accounts, so the sum of all
/// balances always equals `total_supply`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceLedger {
    /// Account -> balance; zero balances are not stored
    balances: HashMap<Address, u64>,
    /// Fixed at construction
    total_supply: u64,
}

impl BalanceLedger {
    /// Mint `total_supply` to `holder`
    pub fn new(holder: Address, total_supply: u64) -> Self {
        let mut balances = HashMap::new();
        if total_supply > 0 {
            balances.insert(holder, total_supply);
        }

        Self {
            balances,
            total_supply,
        }
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Balance of an account; unknown accounts hold 0
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Number of accounts holding a non-zero balance
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Move `amount` from `from` to `to`
    ///
    /// Fails without touching any balance if `from` cannot cover `amount`.
    /// Zero-amount and self transfers succeed and change nothing.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        if amount == 0 || from == to {
            return Ok(());
        }

        // Supply is conserved, so the recipient can never exceed total_supply.
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, remaining);
        }
        *self.balances.entry(*to).or_insert(0) += amount;

        debug!(%from, %to, amount, "balance transferred");
        Ok(())
    }

    /// Sum of all stored balances (equals `total_supply` at every boundary)
    pub fn circulating(&self) -> u128 {
        self.balances.values().map(|&b| u128::from(b)).sum()
    }
}
