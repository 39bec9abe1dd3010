use serde::{Deserialize, Serialize};

/// Sequential proposal identifier, starting at 0
pub type ProposalId = u64;

/// Seconds; always supplied by the caller, never read from a clock here
pub type Timestamp = u64;

/// Lifecycle of a proposal relative to a given `now`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// `now < start_time`
    Created,
    /// `start_time <= now < end_time`; votes accepted
    Active,
    /// `now >= end_time`, not finalized yet; finalize accepted
    Ended,
    /// Terminal
    Finalized,
}

/// A single governance item with a bounded voting window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub(crate) id: ProposalId,
    pub(crate) description: String,
    pub(crate) start_time: Timestamp,
    pub(crate) end_time: Timestamp,
    pub(crate) yes_votes: u64,
    pub(crate) no_votes: u64,
    pub(crate) finalized: bool,
}

impl Proposal {
    pub(crate) fn new(id: ProposalId, description: String, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            id,
            description,
            start_time,
            end_time,
            yes_votes: 0,
            no_votes: 0,
            finalized: false,
        }
    }

    pub fn id(&self) -> ProposalId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn yes_votes(&self) -> u64 {
        self.yes_votes
    }

    pub fn no_votes(&self) -> u64 {
        self.no_votes
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Voting window is the half-open interval `[start_time, end_time)`
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.start_time <= now && now < self.end_time
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end_time
    }

    pub fn state(&self, now: Timestamp) -> ProposalState {
        if self.finalized {
            ProposalState::Finalized
        } else if self.has_ended(now) {
            ProposalState::Ended
        } else if self.is_active(now) {
            ProposalState::Active
        } else {
            ProposalState::Created
        }
    }

    /// Strict majority; a tie does not pass
    pub fn is_passing(&self) -> bool {
        self.yes_votes > self.no_votes
    }
}

/// Record that an account voted on a proposal; never cleared
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub support: bool,
    pub weight: u64,
}

/// Result of finalizing a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub passed: bool,
    pub yes_votes: u64,
    pub no_votes: u64,
}
