use crate::identity::Address;
use crate::proposal::{ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

/// Domain events emitted by successful operations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ProposalCreated {
        id: ProposalId,
        proposer: Address,
        description: String,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: Address,
        support: bool,
        weight: u64,
    },
    ProposalFinalized {
        proposal_id: ProposalId,
        passed: bool,
        yes_votes: u64,
        no_votes: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
}

impl Event {
    /// Proposal this event refers to, if any
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            Event::ProposalCreated { id, .. } => Some(*id),
            Event::VoteCast { proposal_id, .. } | Event::ProposalFinalized { proposal_id, .. } => {
                Some(*proposal_id)
            }
            Event::Transfer { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::ProposalCreated { .. } => "ProposalCreated",
            Event::VoteCast { .. } => "VoteCast",
            Event::ProposalFinalized { .. } => "ProposalFinalized",
            Event::Transfer { .. } => "Transfer",
        }
    }
}

/// An event plus its position in the log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub event: Event,
}

/// Append-only event log
///
/// Sequence numbers start at 0 and have no gaps, so an observer can
/// resume from the last `seq` it saw with [`EventLog::since`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from stored records; the caller checks their sequence
    pub(crate) fn from_records(records: Vec<EventRecord>) -> Self {
        Self { records }
    }

    /// Drop every record with `seq >= len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Append an event and return its record
    pub fn append(&mut self, event: Event) -> &EventRecord {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord { seq, event });
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records with `seq >= seq`
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(self.records.len());
        &self.records[start..]
    }

    pub fn for_proposal(&self, id: ProposalId) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| r.event.proposal_id() == Some(id))
            .collect()
    }
}
