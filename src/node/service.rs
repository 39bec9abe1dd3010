// Governance Node - single-writer execution of signed transactions
//
// All requests flow through one bounded queue into one task that owns the
// voting engine, so operations are applied strictly in submission order.
// A submitted write returns a PendingTx; the caller awaits it to learn
// whether the transaction committed before issuing dependent reads.

use crate::engine::{GovernanceError, VotingEngine};
use crate::events::EventRecord;
use crate::identity::Address;
use crate::node::Clock;
use crate::proposal::{FinalizeOutcome, Proposal, ProposalId, Timestamp};
use crate::storage::{GovernanceStore, StoreError};
use crate::tx::{Command, SignedTransaction, TxId, TxValidator, ValidationError};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Errors surfaced to callers of the node
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(#[from] ValidationError),

    #[error("Duplicate transaction: {0} already applied")]
    DuplicateTransaction(TxId),

    #[error("Rejected: {0}")]
    Rejected(#[from] GovernanceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Node is not running")]
    Closed,
}

/// What a committed transaction returned
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxOutput {
    Transferred(bool),
    ProposalCreated(ProposalId),
    Voted { weight: u64 },
    Finalized(FinalizeOutcome),
}

/// Confirmation of a committed transaction
#[derive(Clone, Debug)]
pub struct Receipt {
    pub tx_id: TxId,
    pub caller: Address,
    /// `now` the transaction was applied at
    pub timestamp: Timestamp,
    pub output: TxOutput,
    /// Events appended by this transaction
    pub events: Vec<EventRecord>,
}

enum Request {
    Submit {
        tx: SignedTransaction,
        reply: oneshot::Sender<Result<Receipt, NodeError>>,
    },
    BalanceOf {
        account: Address,
        reply: oneshot::Sender<u64>,
    },
    TotalSupply {
        reply: oneshot::Sender<u64>,
    },
    Proposal {
        id: ProposalId,
        reply: oneshot::Sender<Result<Proposal, GovernanceError>>,
    },
    NextProposalId {
        reply: oneshot::Sender<ProposalId>,
    },
    EventsSince {
        seq: u64,
        reply: oneshot::Sender<Vec<EventRecord>>,
    },
    Shutdown {
        reply: oneshot::Sender<VotingEngine>,
    },
}

/// Owns the voting engine and applies transactions one at a time
pub struct GovernanceNode<C: Clock> {
    engine: VotingEngine,
    clock: C,
    processed: HashSet<TxId>,
    store: Option<GovernanceStore>,
}

impl<C: Clock> GovernanceNode<C> {
    pub fn new(engine: VotingEngine, clock: C) -> Self {
        Self {
            engine,
            clock,
            processed: HashSet::new(),
            store: None,
        }
    }

    /// Persist every commit to `store`, restoring the set of applied transactions from it
    pub fn with_store(mut self, store: GovernanceStore) -> Result<Self, StoreError> {
        self.processed = store.load_processed()?;
        self.store = Some(store);
        Ok(self)
    }

    pub fn engine(&self) -> &VotingEngine {
        &self.engine
    }

    pub fn into_engine(self) -> VotingEngine {
        self.engine
    }

    /// Validate and apply one transaction at the clock's current time
    pub fn apply(&mut self, signed: &SignedTransaction) -> Result<Receipt, NodeError> {
        let tx_id = signed.id();
        let caller = signed.caller();

        TxValidator::validate(signed)?;
        if self.processed.contains(&tx_id) {
            return Err(NodeError::DuplicateTransaction(tx_id));
        }

        let now = self.clock.now();
        let seq_before = self.engine.events().len() as u64;
        let checkpoint = self.store.as_ref().map(|_| self.engine.checkpoint());

        let output = self.execute(&caller, signed.command(), now)?;
        let events = self.engine.events_since(seq_before).to_vec();

        if let Some(store) = &self.store {
            if let Err(e) = store.commit(&self.engine, &tx_id, &events) {
                error!(%tx_id, error = %e, "failed to persist commit, rolling back");
                if let Some(checkpoint) = checkpoint {
                    self.engine.restore(checkpoint);
                }
                return Err(NodeError::Storage(e));
            }
        }
        self.processed.insert(tx_id);

        info!(%tx_id, %caller, command = signed.command().name(), now, "transaction committed");

        Ok(Receipt {
            tx_id,
            caller,
            timestamp: now,
            output,
            events,
        })
    }

    fn execute(&mut self, caller: &Address, command: &Command, now: Timestamp) -> Result<TxOutput, GovernanceError> {
        let output = match command {
            Command::Transfer { to, amount } => TxOutput::Transferred(self.engine.transfer(caller, to, *amount)?),
            Command::CreateProposal {
                description,
                voting_period,
            } => TxOutput::ProposalCreated(self.engine.create_proposal(caller, description, *voting_period, now)?),
            Command::Vote { proposal_id, support } => TxOutput::Voted {
                weight: self.engine.vote(caller, *proposal_id, *support, now)?,
            },
            Command::Finalize { proposal_id } => TxOutput::Finalized(self.engine.finalize(caller, *proposal_id, now)?),
        };
        Ok(output)
    }

    /// Run the node on the current tokio runtime
    pub fn spawn(self, queue_capacity: usize) -> NodeHandle {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        tokio::spawn(self.run(receiver));
        NodeHandle { sender }
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<Request>) {
        debug!("governance node started");

        while let Some(request) = receiver.recv().await {
            match request {
                Request::Submit { tx, reply } => {
                    let result = self.apply(&tx);
                    if let Err(e) = &result {
                        warn!(tx_id = %tx.id(), error = %e, "transaction rejected");
                    }
                    let _ = reply.send(result);
                }
                Request::BalanceOf { account, reply } => {
                    let _ = reply.send(self.engine.balance_of(&account));
                }
                Request::TotalSupply { reply } => {
                    let _ = reply.send(self.engine.total_supply());
                }
                Request::Proposal { id, reply } => {
                    let _ = reply.send(self.engine.proposal(id).cloned());
                }
                Request::NextProposalId { reply } => {
                    let _ = reply.send(self.engine.next_proposal_id());
                }
                Request::EventsSince { seq, reply } => {
                    let _ = reply.send(self.engine.events_since(seq).to_vec());
                }
                Request::Shutdown { reply } => {
                    debug!("governance node shutting down");
                    let _ = reply.send(self.engine);
                    return;
                }
            }
        }

        debug!("all node handles dropped, stopping");
    }
}

/// A submitted transaction awaiting its commit result
pub struct PendingTx {
    id: TxId,
    reply: oneshot::Receiver<Result<Receipt, NodeError>>,
}

impl PendingTx {
    pub fn id(&self) -> TxId {
        self.id
    }

    /// Wait until the node has applied (or rejected) the transaction
    pub async fn wait(self) -> Result<Receipt, NodeError> {
        self.reply.await.map_err(|_| NodeError::Closed)?
    }
}

/// Cloneable handle for talking to a running node
#[derive(Clone)]
pub struct NodeHandle {
    sender: mpsc::Sender<Request>,
}

impl NodeHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T, NodeError> {
        let (reply, receiver) = oneshot::channel();
        self.sender.send(build(reply)).await.map_err(|_| NodeError::Closed)?;
        receiver.await.map_err(|_| NodeError::Closed)
    }

    /// Queue a signed transaction; resolves once it is accepted into the queue
    pub async fn submit(&self, tx: SignedTransaction) -> Result<PendingTx, NodeError> {
        let id = tx.id();
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(Request::Submit { tx, reply })
            .await
            .map_err(|_| NodeError::Closed)?;
        Ok(PendingTx { id, reply: receiver })
    }

    /// Submit and wait for the receipt
    pub async fn submit_and_wait(&self, tx: SignedTransaction) -> Result<Receipt, NodeError> {
        self.submit(tx).await?.wait().await
    }

    pub async fn balance_of(&self, account: Address) -> Result<u64, NodeError> {
        self.request(|reply| Request::BalanceOf { account, reply }).await
    }

    pub async fn total_supply(&self) -> Result<u64, NodeError> {
        self.request(|reply| Request::TotalSupply { reply }).await
    }

    pub async fn proposal(&self, id: ProposalId) -> Result<Proposal, NodeError> {
        Ok(self.request(|reply| Request::Proposal { id, reply }).await??)
    }

    pub async fn next_proposal_id(&self) -> Result<ProposalId, NodeError> {
        self.request(|reply| Request::NextProposalId { reply }).await
    }

    pub async fn events_since(&self, seq: u64) -> Result<Vec<EventRecord>, NodeError> {
        self.request(|reply| Request::EventsSince { seq, reply }).await
    }

    /// Stop the node after everything queued before this call, returning its engine
    pub async fn shutdown(&self) -> Result<VotingEngine, NodeError> {
        self.request(|reply| Request::Shutdown { reply }).await
    }
}
