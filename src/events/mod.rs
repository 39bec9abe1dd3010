// Events module - WHAT HAPPENED
// Append-only domain event log read by external observers

mod log;

pub use log::{Event, EventLog, EventRecord};
