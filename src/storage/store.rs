// GovernanceStore - Persistent key-value storage using sled
//
// Provides typed access for storing:
// - Labelled signing keypairs
// - Voting engine state (ledger, proposals, receipts)
// - Event records, one key per sequence number
// - Ids of transactions already applied

use crate::engine::{SnapshotError, VotingEngine};
use crate::events::EventRecord;
use crate::identity::Keypair;
use crate::tx::TxId;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Key prefixes for organizing data
mod keys {
    pub const KEYPAIR_PREFIX: &[u8] = b"identity:keypair:";
    pub const ENGINE: &[u8] = b"engine:state";
    pub const EVENT_PREFIX: &[u8] = b"engine:event:";
    pub const PROCESSED_TX_PREFIX: &[u8] = b"tx:processed:";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

impl From<SnapshotError> for StoreError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Encode(msg) => StoreError::SerializationFailed(msg),
            other => StoreError::DeserializationFailed(other.to_string()),
        }
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of keys in the database
    pub key_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent key-value store for governance data
///
/// Uses sled for crash-safe, embedded storage.
/// All writes are atomic and durable after flush.
#[derive(Clone)]
pub struct GovernanceStore {
    db: sled::Db,
}

impl GovernanceStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.db.is_empty())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        Ok(StorageStats {
            key_count: self.db.len(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    // ========================================================================
    // RAW KEY-VALUE OPERATIONS
    // ========================================================================

    pub fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    pub fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db.remove(key)?;
        Ok(())
    }

    // ========================================================================
    // KEYPAIRS
    // ========================================================================

    pub fn save_keypair_with_label(&self, keypair: &Keypair, label: &str) -> Result<(), StoreError> {
        let key = [keys::KEYPAIR_PREFIX, label.as_bytes()].concat();
        self.put_raw(&key, &keypair.to_bytes())
    }

    pub fn load_keypair_with_label(&self, label: &str) -> Result<Option<Keypair>, StoreError> {
        let key = [keys::KEYPAIR_PREFIX, label.as_bytes()].concat();
        match self.get_raw(&key)? {
            Some(bytes) => {
                let keypair = Keypair::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(keypair))
            }
            None => Ok(None),
        }
    }

    /// Labels of all stored keypairs, sorted
    pub fn list_labels(&self) -> Result<Vec<String>, StoreError> {
        let mut labels = Vec::new();
        for result in self.db.scan_prefix(keys::KEYPAIR_PREFIX) {
            let (key, _) = result?;
            let label = String::from_utf8_lossy(&key[keys::KEYPAIR_PREFIX.len()..]).into_owned();
            labels.push(label);
        }
        Ok(labels)
    }

    // ========================================================================
    // ENGINE STATE
    // ========================================================================

    /// Write the engine state and its whole event log
    pub fn save_engine(&self, engine: &VotingEngine) -> Result<(), StoreError> {
        let records: Vec<EventRecord> = engine.events().iter().cloned().collect();
        let batch = engine_batch(engine, &records)?;
        debug!(events = records.len(), "saving engine");
        self.db.apply_batch(batch)?;
        Ok(())
    }

    pub fn load_engine(&self) -> Result<Option<VotingEngine>, StoreError> {
        let Some(state) = self.get_raw(keys::ENGINE)? else {
            return Ok(None);
        };

        let mut records = Vec::new();
        for result in self.db.scan_prefix(keys::EVENT_PREFIX) {
            let (_, value) = result?;
            let record: EventRecord =
                postcard::from_bytes(&value).map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
            records.push(record);
        }

        Ok(Some(VotingEngine::from_state_bytes(&state, records)?))
    }

    /// Save the engine state, append `new_events` and mark `tx_id` applied in one atomic batch
    ///
    /// Earlier event records are never rewritten.
    pub fn commit(&self, engine: &VotingEngine, tx_id: &TxId, new_events: &[EventRecord]) -> Result<(), StoreError> {
        let mut batch = engine_batch(engine, new_events)?;
        batch.insert(processed_key(tx_id), Vec::<u8>::new());
        self.db.apply_batch(batch)?;
        self.flush()
    }

    // ========================================================================
    // PROCESSED TRANSACTIONS
    // ========================================================================

    pub fn mark_processed(&self, tx_id: &TxId) -> Result<(), StoreError> {
        self.put_raw(&processed_key(tx_id), &[])
    }

    pub fn is_processed(&self, tx_id: &TxId) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(processed_key(tx_id))?)
    }

    pub fn load_processed(&self) -> Result<HashSet<TxId>, StoreError> {
        let mut processed = HashSet::new();
        for result in self.db.scan_prefix(keys::PROCESSED_TX_PREFIX) {
            let (key, _) = result?;
            let raw: [u8; 32] = key[keys::PROCESSED_TX_PREFIX.len()..]
                .try_into()
                .map_err(|_| StoreError::DeserializationFailed("Invalid transaction id length".to_string()))?;
            processed.insert(TxId::from_bytes(raw));
        }
        Ok(processed)
    }
}

fn engine_batch(engine: &VotingEngine, records: &[EventRecord]) -> Result<sled::Batch, StoreError> {
    let mut batch = sled::Batch::default();
    batch.insert(keys::ENGINE, engine.state_to_bytes()?);
    for record in records {
        let value = postcard::to_allocvec(record).map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        batch.insert(event_key(record.seq), value);
    }
    Ok(batch)
}

/// Big-endian seq so a prefix scan yields records in order
fn event_key(seq: u64) -> Vec<u8> {
    [keys::EVENT_PREFIX, &seq.to_be_bytes()[..]].concat()
}

fn processed_key(tx_id: &TxId) -> Vec<u8> {
    [keys::PROCESSED_TX_PREFIX, &tx_id.as_bytes()[..]].concat()
}
