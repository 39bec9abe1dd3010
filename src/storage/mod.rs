// Storage module - PERSISTENCE
// Durable engine snapshots, signing keys and processed transactions using sled

mod store;

pub use store::{GovernanceStore, StorageStats, StoreError};
