// Identity module - who is calling
// Ed25519 keys sign transactions, addresses name accounts in the ledger

mod address;
mod keypair;
mod signer;

pub use address::*;
pub use keypair::*;
pub use signer::*;
