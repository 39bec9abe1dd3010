use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a governance node
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory of the sled database
    pub data_dir: PathBuf,
    /// Supply minted to the initial holder when a ledger is created
    pub initial_supply: u64,
    /// Voting period used when a proposal does not specify one (seconds)
    pub default_voting_period: u64,
    /// Maximum queued requests before `submit` waits
    pub queue_capacity: usize,
    /// Persist every commit to the store
    pub persist: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".dao"),
            initial_supply: 1_000_000,
            default_voting_period: 60,
            queue_capacity: 64,
            persist: true,
        }
    }
}

impl NodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_initial_supply(mut self, supply: u64) -> Self {
        self.initial_supply = supply;
        self
    }

    pub fn with_default_voting_period(mut self, secs: u64) -> Self {
        self.default_voting_period = secs;
        self
    }

    /// Clamped to at least 1 (a zero-capacity channel cannot be built)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}
