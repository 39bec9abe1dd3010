// Engine module - THE VOTING RULES
// Orchestrates create / vote / finalize against the ledger and proposal store

mod error;
mod voting;

pub use error::{ErrorKind, GovernanceError, SnapshotError};
pub use voting::{Checkpoint, VotingEngine};
