// Proposal module - THE GOVERNANCE ITEMS
// Proposal records, vote receipts and the per-proposal state machine

mod model;
mod store;

pub use model::{FinalizeOutcome, Proposal, ProposalId, ProposalState, Timestamp, VoteReceipt};
pub use store::{ProposalError, ProposalStore};
