//! Token-weighted governance voting.
//!
//! Accounts holding a fixed-supply governance balance create proposals, cast
//! balance-weighted yes/no votes inside a bounded window, and finalize
//! proposals into a pass/fail outcome. [`engine::VotingEngine`] is the state
//! machine; [`node::GovernanceNode`] runs it behind a queue of signed
//! transactions.

pub mod engine;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod node;
pub mod proposal;
pub mod storage;
pub mod tx;
