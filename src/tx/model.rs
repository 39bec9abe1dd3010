use crate::identity::{Address, PublicKey, Signature, Signer};
use crate::proposal::ProposalId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Unique identifier for a transaction (SHA256 of its signing bytes)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId([u8; 32]);

impl TxId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// A write operation against the governance state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Transfer { to: Address, amount: u64 },
    CreateProposal { description: String, voting_period: u64 },
    Vote { proposal_id: ProposalId, support: bool },
    Finalize { proposal_id: ProposalId },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Transfer { .. } => "transfer",
            Command::CreateProposal { .. } => "createProposal",
            Command::Vote { .. } => "vote",
            Command::Finalize { .. } => "finalize",
        }
    }

    fn write_signing_bytes(&self, bytes: &mut Vec<u8>) {
        match self {
            Command::Transfer { to, amount } => {
                bytes.push(0);
                bytes.extend_from_slice(to.as_bytes());
                bytes.extend_from_slice(&amount.to_le_bytes());
            }
            Command::CreateProposal {
                description,
                voting_period,
            } => {
                bytes.push(1);
                bytes.extend_from_slice(&(description.len() as u32).to_le_bytes());
                bytes.extend_from_slice(description.as_bytes());
                bytes.extend_from_slice(&voting_period.to_le_bytes());
            }
            Command::Vote { proposal_id, support } => {
                bytes.push(2);
                bytes.extend_from_slice(&proposal_id.to_le_bytes());
                bytes.push(u8::from(*support));
            }
            Command::Finalize { proposal_id } => {
                bytes.push(3);
                bytes.extend_from_slice(&proposal_id.to_le_bytes());
            }
        }
    }
}

/// An unsigned transaction: who, what, and a nonce to make it unique
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    sender: PublicKey,
    command: Command,
    nonce: u64,
}

impl Transaction {
    pub fn new(sender: PublicKey, command: Command, nonce: u64) -> Self {
        Self {
            sender,
            command,
            nonce,
        }
    }

    pub fn sender(&self) -> &PublicKey {
        &self.sender
    }

    /// Account the command acts on behalf of
    pub fn caller(&self) -> Address {
        self.sender.address()
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn id(&self) -> TxId {
        let hash = Sha256::digest(self.to_signing_bytes());
        let mut id = [0u8; 32];
        id.copy_from_slice(&hash);
        TxId(id)
    }

    /// Deterministic byte layout covered by the signature
    pub fn to_signing_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(96);
        bytes.extend_from_slice(b"dao-voting:tx:v1");
        bytes.extend_from_slice(self.sender.as_bytes());
        self.command.write_signing_bytes(&mut bytes);
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes
    }
}

/// A transaction and the sender's signature over it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    tx: Transaction,
    signature: Signature,
}

impl SignedTransaction {
    pub fn from_parts(tx: Transaction, signature: Signature) -> Self {
        Self { tx, signature }
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn id(&self) -> TxId {
        self.tx.id()
    }

    pub fn caller(&self) -> Address {
        self.tx.caller()
    }

    pub fn command(&self) -> &Command {
        self.tx.command()
    }

    /// Check the signature against the embedded sender key
    pub fn verify(&self) -> bool {
        Signer::verify(self.tx.sender(), &self.tx.to_signing_bytes(), &self.signature)
    }
}
