use crate::identity::{Address, Keypair, Signer};
use crate::proposal::ProposalId;
use crate::tx::{Command, SignedTransaction, Transaction};
use rand::Rng;
use thiserror::Error;

/// Errors that can occur when building a transaction
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TxError {
    #[error("Missing signer: a keypair is required to sign the transaction")]
    MissingSigner,

    #[error("Missing command: nothing to submit")]
    MissingCommand,

    #[error("Proposal description cannot be empty")]
    EmptyDescription,
}

/// Builder for creating signed transactions
pub struct TxBuilder<'a> {
    signer: Option<&'a Keypair>,
    command: Option<Command>,
    nonce: Option<u64>,
}

impl<'a> TxBuilder<'a> {
    pub fn new() -> Self {
        Self {
            signer: None,
            command: None,
            nonce: None,
        }
    }

    /// Set the signing keypair (required)
    pub fn signer(mut self, keypair: &'a Keypair) -> Self {
        self.signer = Some(keypair);
        self
    }

    /// Set the command directly
    pub fn command(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }

    pub fn transfer(self, to: Address, amount: u64) -> Self {
        self.command(Command::Transfer { to, amount })
    }

    pub fn create_proposal(self, description: impl Into<String>, voting_period: u64) -> Self {
        self.command(Command::CreateProposal {
            description: description.into(),
            voting_period,
        })
    }

    pub fn vote(self, proposal_id: ProposalId, support: bool) -> Self {
        self.command(Command::Vote { proposal_id, support })
    }

    pub fn finalize(self, proposal_id: ProposalId) -> Self {
        self.command(Command::Finalize { proposal_id })
    }

    /// Set the nonce (optional - random if not provided)
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Build and sign the transaction
    pub fn build(self) -> Result<SignedTransaction, TxError> {
        let keypair = self.signer.ok_or(TxError::MissingSigner)?;
        let command = self.command.ok_or(TxError::MissingCommand)?;

        if let Command::CreateProposal { description, .. } = &command {
            if description.trim().is_empty() {
                return Err(TxError::EmptyDescription);
            }
        }

        let nonce = self.nonce.unwrap_or_else(|| rand::thread_rng().gen::<u64>());

        let tx = Transaction::new(keypair.public_key(), command, nonce);
        let signature = Signer::sign(keypair, &tx.to_signing_bytes());

        Ok(SignedTransaction::from_parts(tx, signature))
    }
}

impl<'a> Default for TxBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
