// Node module - THE EXECUTION ENVIRONMENT
// Serializes signed transactions onto a single engine task and hands back pending receipts

mod clock;
mod config;
mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::NodeConfig;
pub use service::{GovernanceNode, NodeError, NodeHandle, PendingTx, Receipt, TxOutput};
