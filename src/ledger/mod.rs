// Ledger module - THE GOVERNANCE BALANCES
// Fixed-supply fungible balances; the source of voting weight

mod balance;

pub use balance::{BalanceLedger, LedgerError};
