// Voting Engine - the only writer of the proposal store and the only
// reader of the balance ledger for voting weight

use crate::engine::error::{GovernanceError, SnapshotError};
use crate::events::{Event, EventLog, EventRecord};
use crate::identity::Address;
use crate::ledger::BalanceLedger;
use crate::proposal::{FinalizeOutcome, Proposal, ProposalId, ProposalStore, Timestamp, VoteReceipt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Governance state machine over a balance ledger
///
/// Every operation is resolved atomically: all preconditions are checked
/// before anything is mutated, and exactly one event is appended on success.
/// Time is always passed in as `now`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingEngine {
    ledger: BalanceLedger,
    proposals: ProposalStore,
    events: EventLog,
}

impl VotingEngine {
    /// Mint the whole governance supply to `holder` and start with no proposals
    pub fn new(holder: Address, total_supply: u64) -> Self {
        info!(%holder, total_supply, "governance ledger created");
        Self {
            ledger: BalanceLedger::new(holder, total_supply),
            proposals: ProposalStore::new(),
            events: EventLog::new(),
        }
    }

    // ========================================================================
    // LEDGER
    // ========================================================================

    pub fn balance_of(&self, account: &Address) -> u64 {
        self.ledger.balance_of(account)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    /// Move governance balance from `caller` to `to`
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: u64) -> Result<bool, GovernanceError> {
        self.ledger.transfer(caller, to, amount).map_err(|e| {
            warn!(%caller, %to, amount, error = %e, "transfer rejected");
            GovernanceError::from(e)
        })?;

        self.events.append(Event::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        Ok(true)
    }

    // ========================================================================
    // PROPOSALS
    // ========================================================================

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        description: &str,
        voting_period: u64,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let id = self
            .proposals
            .create(description.to_string(), voting_period, now)
            .map_err(|e| {
                warn!(%caller, voting_period, error = %e, "proposal creation rejected");
                GovernanceError::from(e)
            })?;

        let proposal = self.proposals.get(id)?;
        let (start_time, end_time) = (proposal.start_time(), proposal.end_time());

        self.events.append(Event::ProposalCreated {
            id,
            proposer: *caller,
            description: description.to_string(),
            start_time,
            end_time,
        });

        info!(id, proposer = %caller, start_time, end_time, "proposal created");
        Ok(id)
    }

    /// Cast `caller`'s vote with weight equal to its balance right now
    ///
    /// The weight is a live read, not a snapshot taken at proposal creation,
    /// so balance moved to another account after voting can vote again there.
    pub fn vote(
        &mut self,
        caller: &Address,
        id: ProposalId,
        support: bool,
        now: Timestamp,
    ) -> Result<u64, GovernanceError> {
        let weight = self.ledger.balance_of(caller);

        self.proposals
            .record_vote(id, caller, support, weight, now)
            .map_err(|e| {
                warn!(id, voter = %caller, error = %e, "vote rejected");
                GovernanceError::from(e)
            })?;

        self.events.append(Event::VoteCast {
            proposal_id: id,
            voter: *caller,
            support,
            weight,
        });

        debug!(id, voter = %caller, support, weight, "vote cast");
        Ok(weight)
    }

    /// Close a proposal whose window has ended; anyone may call this
    pub fn finalize(&mut self, caller: &Address, id: ProposalId, now: Timestamp) -> Result<FinalizeOutcome, GovernanceError> {
        let outcome = self.proposals.finalize(id, now).map_err(|e| {
            warn!(id, %caller, error = %e, "finalize rejected");
            GovernanceError::from(e)
        })?;

        self.events.append(Event::ProposalFinalized {
            proposal_id: id,
            passed: outcome.passed,
            yes_votes: outcome.yes_votes,
            no_votes: outcome.no_votes,
        });

        info!(
            id,
            %caller,
            passed = outcome.passed,
            yes = outcome.yes_votes,
            no = outcome.no_votes,
            "proposal finalized"
        );
        Ok(outcome)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        Ok(self.proposals.get(id)?)
    }

    pub fn proposals(&self) -> &ProposalStore {
        &self.proposals
    }

    pub fn next_proposal_id(&self) -> ProposalId {
        self.proposals.next_id()
    }

    pub fn has_voted(&self, id: ProposalId, account: &Address) -> bool {
        self.proposals.has_voted(id, account)
    }

    pub fn receipt(&self, id: ProposalId, account: &Address) -> Option<&VoteReceipt> {
        self.proposals.receipt(id, account)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.events.since(seq)
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Serialize the whole engine (ledger, proposals, receipts, events)
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        postcard::to_allocvec(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Restore an engine from [`VotingEngine::to_bytes`], rejecting inconsistent snapshots
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let engine: VotingEngine =
            postcard::from_bytes(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        engine.verify()?;
        Ok(engine)
    }

    /// Serialize the ledger and proposals only; events are stored record by record
    pub fn state_to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let state = StateRef {
            ledger: &self.ledger,
            proposals: &self.proposals,
        };
        postcard::to_allocvec(&state).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Rebuild an engine from [`VotingEngine::state_to_bytes`] plus its event records
    pub fn from_state_bytes(bytes: &[u8], records: Vec<EventRecord>) -> Result<Self, SnapshotError> {
        let state: State = postcard::from_bytes(bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        let engine = Self {
            ledger: state.ledger,
            proposals: state.proposals,
            events: EventLog::from_records(records),
        };
        engine.verify()?;
        Ok(engine)
    }

    fn verify(&self) -> Result<(), SnapshotError> {
        let circulating = self.ledger.circulating();
        let total_supply = self.ledger.total_supply();
        if circulating != u128::from(total_supply) {
            return Err(SnapshotError::SupplyMismatch {
                circulating,
                total_supply,
            });
        }

        let mut receipts = 0usize;
        for (position, proposal) in self.proposals.iter().enumerate() {
            let id = proposal.id();
            if id != position as u64 {
                return Err(SnapshotError::ProposalIdMismatch {
                    position: position as u64,
                    id,
                });
            }

            let (mut yes, mut no) = (0u128, 0u128);
            for (_, receipt) in self.proposals.receipts_for(id) {
                receipts += 1;
                if receipt.support {
                    yes += u128::from(receipt.weight);
                } else {
                    no += u128::from(receipt.weight);
                }
            }
            if yes != u128::from(proposal.yes_votes()) || no != u128::from(proposal.no_votes()) {
                return Err(SnapshotError::TallyMismatch(id));
            }
        }
        if receipts != self.proposals.receipt_count() {
            return Err(SnapshotError::OrphanReceipts(self.proposals.receipt_count() - receipts));
        }

        for (position, record) in self.events.iter().enumerate() {
            if record.seq != position as u64 {
                return Err(SnapshotError::EventGap {
                    position: position as u64,
                    seq: record.seq,
                });
            }
        }

        Ok(())
    }

    // ========================================================================
    // ROLLBACK
    // ========================================================================

    /// Capture everything needed to undo later operations
    ///
    /// The event log is append-only, so only its length is recorded.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            ledger: self.ledger.clone(),
            proposals: self.proposals.clone(),
            events_len: self.events.len(),
        }
    }

    /// Return to the state captured by `checkpoint`, dropping newer events
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.ledger = checkpoint.ledger;
        self.proposals = checkpoint.proposals;
        self.events.truncate(checkpoint.events_len);
    }
}

/// Engine state saved by [`VotingEngine::checkpoint`]
#[derive(Clone, Debug)]
pub struct Checkpoint {
    ledger: BalanceLedger,
    proposals: ProposalStore,
    events_len: usize,
}

#[derive(Serialize)]
struct StateRef<'a> {
    ledger: &'a BalanceLedger,
    proposals: &'a ProposalStore,
}

#[derive(Deserialize)]
struct State {
    ledger: BalanceLedger,
    proposals: ProposalStore,
}
