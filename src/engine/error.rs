use crate::ledger::LedgerError;
use crate::proposal::{ProposalError, ProposalId};
use thiserror::Error;

/// Coarse classification of a governance failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any state access
    Validation,
    /// Reference to a proposal that was never created
    NotFound,
    /// Operation invalid for the proposal's current state
    State,
    /// Caller lacks the standing the operation requires
    Authorization,
}

/// Any failure of a voting engine operation
///
/// A failed operation has no side effects: no balance moved, no field
/// changed, no receipt created, no event appended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Proposal(#[from] ProposalError),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GovernanceError::Ledger(LedgerError::InsufficientBalance { .. }) => ErrorKind::Validation,
            GovernanceError::Proposal(err) => match err {
                ProposalError::InvalidPeriod(_) => ErrorKind::Validation,
                ProposalError::NotFound(_) => ErrorKind::NotFound,
                ProposalError::NoVotingPower => ErrorKind::Authorization,
                ProposalError::NotActive { .. }
                | ProposalError::AlreadyVoted(_)
                | ProposalError::VotingNotEnded { .. }
                | ProposalError::AlreadyFinalized(_)
                | ProposalError::TallyOverflow(_) => ErrorKind::State,
            },
        }
    }
}

/// Failure to restore an engine from its serialized snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to encode engine snapshot: {0}")]
    Encode(String),

    #[error("Failed to decode engine snapshot: {0}")]
    Decode(String),

    #[error("Corrupt snapshot: balances sum to {circulating}, supply is {total_supply}")]
    SupplyMismatch { circulating: u128, total_supply: u64 },

    #[error("Corrupt snapshot: proposal at position {position} has id {id}")]
    ProposalIdMismatch { position: u64, id: ProposalId },

    #[error("Corrupt snapshot: tallies of proposal {0} differ from its receipts")]
    TallyMismatch(ProposalId),

    #[error("Corrupt snapshot: {0} receipts reference missing proposals")]
    OrphanReceipts(usize),

    #[error("Corrupt snapshot: event at position {position} has seq {seq}")]
    EventGap { position: u64, seq: u64 },
}
