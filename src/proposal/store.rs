// Proposal Store - proposal records plus per-(proposal, account) vote receipts

use crate::identity::Address;
use crate::proposal::model::{FinalizeOutcome, Proposal, ProposalId, Timestamp, VoteReceipt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during proposal operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Voting period must be > 0 and keep the end time representable (got {0})")]
    InvalidPeriod(u64),

    #[error("Proposal does not exist: {0}")]
    NotFound(ProposalId),

    #[error("Voting is not active for proposal {id} (window [{start_time}, {end_time}), now {now})")]
    NotActive {
        id: ProposalId,
        start_time: Timestamp,
        end_time: Timestamp,
        now: Timestamp,
    },

    #[error("No voting power")]
    NoVotingPower,

    #[error("Already voted on proposal {0}")]
    AlreadyVoted(ProposalId),

    #[error("Voting not ended for proposal {id}: ends at {end_time}, now {now}")]
    VotingNotEnded {
        id: ProposalId,
        end_time: Timestamp,
        now: Timestamp,
    },

    #[error("Proposal {0} already finalized")]
    AlreadyFinalized(ProposalId),

    #[error("Tally would overflow on proposal {0}")]
    TallyOverflow(ProposalId),
}

/// Durable collection of proposals and vote receipts
///
/// Ids are the positions in `proposals`, so they are gap-free and start at 0.
/// Every mutating operation validates fully before it touches anything.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
    receipts: HashMap<(ProposalId, Address), VoteReceipt>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next successful `create` will assign
    pub fn next_id(&self) -> ProposalId {
        self.proposals.len() as ProposalId
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// Store a new proposal open for voting over `[now, now + voting_period)`
    pub fn create(
        &mut self,
        description: String,
        voting_period: u64,
        now: Timestamp,
    ) -> Result<ProposalId, ProposalError> {
        if voting_period == 0 {
            return Err(ProposalError::InvalidPeriod(voting_period));
        }
        let end_time = now
            .checked_add(voting_period)
            .ok_or(ProposalError::InvalidPeriod(voting_period))?;

        let id = self.next_id();
        self.proposals.push(Proposal::new(id, description, now, end_time));
        Ok(id)
    }

    pub fn get(&self, id: ProposalId) -> Result<&Proposal, ProposalError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.proposals.get(index))
            .ok_or(ProposalError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, ProposalError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.proposals.get_mut(index))
            .ok_or(ProposalError::NotFound(id))
    }

    pub fn has_voted(&self, id: ProposalId, account: &Address) -> bool {
        self.receipts.contains_key(&(id, *account))
    }

    pub fn receipt(&self, id: ProposalId, account: &Address) -> Option<&VoteReceipt> {
        self.receipts.get(&(id, *account))
    }

    /// Number of receipts across all proposals
    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }

    /// Receipts for a single proposal, in no particular order
    pub fn receipts_for(&self, id: ProposalId) -> impl Iterator<Item = (&Address, &VoteReceipt)> {
        self.receipts
            .iter()
            .filter(move |((pid, _), _)| *pid == id)
            .map(|((_, account), receipt)| (account, receipt))
    }

    /// Record a weighted vote
    ///
    /// Checks run in order: NotFound, NotActive, NoVotingPower, AlreadyVoted.
    /// A finalized proposal is never active.
    pub fn record_vote(
        &mut self,
        id: ProposalId,
        account: &Address,
        support: bool,
        weight: u64,
        now: Timestamp,
    ) -> Result<(), ProposalError> {
        let proposal = self.get(id)?;

        // Finalized is terminal even if `now` falls back inside the window.
        if proposal.finalized || !proposal.is_active(now) {
            return Err(ProposalError::NotActive {
                id,
                start_time: proposal.start_time,
                end_time: proposal.end_time,
                now,
            });
        }

        if weight == 0 {
            return Err(ProposalError::NoVotingPower);
        }

        if self.has_voted(id, account) {
            return Err(ProposalError::AlreadyVoted(id));
        }

        let tally = if support { proposal.yes_votes } else { proposal.no_votes };
        let new_tally = tally.checked_add(weight).ok_or(ProposalError::TallyOverflow(id))?;

        // All checks passed; commit.
        let proposal = self.get_mut(id)?;
        if support {
            proposal.yes_votes = new_tally;
        } else {
            proposal.no_votes = new_tally;
        }
        self.receipts.insert((id, *account), VoteReceipt { support, weight });

        Ok(())
    }

    /// Close voting and compute the outcome; one-way and once only
    pub fn finalize(&mut self, id: ProposalId, now: Timestamp) -> Result<FinalizeOutcome, ProposalError> {
        let proposal = self.get_mut(id)?;

        if !proposal.has_ended(now) {
            return Err(ProposalError::VotingNotEnded {
                id,
                end_time: proposal.end_time,
                now,
            });
        }

        if proposal.finalized {
            return Err(ProposalError::AlreadyFinalized(id));
        }

        proposal.finalized = true;

        Ok(FinalizeOutcome {
            passed: proposal.is_passing(),
            yes_votes: proposal.yes_votes,
            no_votes: proposal.no_votes,
        })
    }
}
