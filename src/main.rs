// dao - command line front end for a local governance ledger

use clap::{Parser, Subcommand, ValueEnum};
use dao_voting::engine::VotingEngine;
use dao_voting::events::{Event, EventRecord};
use dao_voting::identity::{Address, Keypair};
use dao_voting::node::{Clock, GovernanceNode, NodeConfig, NodeError, Receipt, SystemClock, TxOutput};
use dao_voting::proposal::ProposalId;
use dao_voting::storage::{GovernanceStore, StoreError};
use dao_voting::tx::{CodecError, SignedTransaction, TxBuilder, TxCodec, TxError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dao")]
#[command(about = "Token-weighted proposals and voting on a local ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of the governance database
    #[arg(short, long, global = true, default_value = ".dao")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the signed transaction as hex instead of submitting it
    #[arg(long, global = true)]
    dry_run: bool,

    /// Apply the transaction and print its receipt without saving the result
    #[arg(long, global = true)]
    no_persist: bool,

    /// Requests the node may queue before submitters wait
    #[arg(long, global = true)]
    queue_capacity: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Choice {
    Yes,
    No,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger, minting the whole supply to a holder key
    Init {
        /// Total governance supply
        #[arg(short, long)]
        supply: Option<u64>,

        /// Label of the holder key (generated if missing)
        #[arg(long, default_value = "deployer")]
        holder: String,
    },

    /// Generate and store a signing key
    Keygen {
        #[arg(short, long)]
        label: String,
    },

    /// Show the address of a stored key
    Address {
        #[arg(short, long)]
        label: String,
    },

    /// Show the governance balance of an address or key label
    Balance { account: String },

    /// Transfer governance balance
    Transfer {
        #[arg(long)]
        from: String,
        /// Recipient address or key label
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u64,
    },

    /// Create a proposal
    Propose {
        #[arg(long)]
        from: String,
        #[arg(short = 'm', long)]
        description: String,
        /// Voting period in seconds
        #[arg(short, long)]
        period: Option<u64>,
    },

    /// Vote on a proposal with your full balance
    Vote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        id: ProposalId,
        #[arg(long, value_enum)]
        choice: Choice,
    },

    /// Finalize a proposal whose voting window has ended
    Finalize {
        #[arg(long)]
        from: String,
        #[arg(long)]
        id: ProposalId,
    },

    /// Submit a hex-encoded signed transaction
    Submit {
        #[arg(long)]
        tx: String,
    },

    /// Show a proposal
    Show {
        #[arg(long)]
        id: ProposalId,
    },

    /// Print the id the next proposal will get
    NextId,

    /// List events
    Events {
        /// First sequence number to show
        #[arg(long, default_value = "0")]
        since: u64,
    },

    /// Show database and ledger statistics
    Stats,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("No ledger in {0}; run `dao init` first")]
    NotInitialized(PathBuf),

    #[error("A ledger already exists in {0}")]
    AlreadyInitialized(PathBuf),

    #[error("No key stored under label '{0}'")]
    UnknownLabel(String),

    #[error("A key already exists under label '{0}'")]
    LabelTaken(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Tx(#[from] TxError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = NodeConfig::new()
        .with_data_dir(cli.data_dir.clone())
        .with_persist(!cli.no_persist);
    if let Some(capacity) = cli.queue_capacity {
        config = config.with_queue_capacity(capacity);
    }
    let store = GovernanceStore::open(&config.data_dir)?;
    debug!(data_dir = %config.data_dir.display(), "store opened");

    match cli.command {
        Commands::Init { supply, holder } => {
            if store.load_engine()?.is_some() {
                return Err(CliError::AlreadyInitialized(config.data_dir));
            }
            let keypair = match store.load_keypair_with_label(&holder)? {
                Some(kp) => kp,
                None => {
                    let kp = Keypair::generate();
                    store.save_keypair_with_label(&kp, &holder)?;
                    kp
                }
            };
            if let Some(supply) = supply {
                config = config.with_initial_supply(supply);
            }
            let supply = config.initial_supply;
            let engine = VotingEngine::new(keypair.address(), supply);
            store.save_engine(&engine)?;
            store.flush()?;
            println!("Minted {} to {} ({})", supply, holder, keypair.address());
        }
        Commands::Keygen { label } => {
            if store.load_keypair_with_label(&label)?.is_some() {
                return Err(CliError::LabelTaken(label));
            }
            let keypair = Keypair::generate();
            store.save_keypair_with_label(&keypair, &label)?;
            store.flush()?;
            println!("{}: {}", label, keypair.address());
        }
        Commands::Address { label } => {
            println!("{}", load_keypair(&store, &label)?.address());
        }
        Commands::Balance { account } => {
            let engine = load_engine(&store, &config)?;
            let address = resolve_account(&store, &account)?;
            println!("{}: {}", address, engine.balance_of(&address));
        }
        Commands::Transfer { from, to, amount } => {
            let keypair = load_keypair(&store, &from)?;
            let to = resolve_account(&store, &to)?;
            let tx = TxBuilder::new().signer(&keypair).transfer(to, amount).build()?;
            dispatch(&store, &config, tx, cli.dry_run).await?;
        }
        Commands::Propose {
            from,
            description,
            period,
        } => {
            let keypair = load_keypair(&store, &from)?;
            if let Some(period) = period {
                config = config.with_default_voting_period(period);
            }
            let period = config.default_voting_period;
            let tx = TxBuilder::new()
                .signer(&keypair)
                .create_proposal(description, period)
                .build()?;
            dispatch(&store, &config, tx, cli.dry_run).await?;
        }
        Commands::Vote { from, id, choice } => {
            let keypair = load_keypair(&store, &from)?;
            let support = matches!(choice, Choice::Yes);
            let tx = TxBuilder::new().signer(&keypair).vote(id, support).build()?;
            dispatch(&store, &config, tx, cli.dry_run).await?;
        }
        Commands::Finalize { from, id } => {
            let keypair = load_keypair(&store, &from)?;
            let tx = TxBuilder::new().signer(&keypair).finalize(id).build()?;
            dispatch(&store, &config, tx, cli.dry_run).await?;
        }
        Commands::Submit { tx } => {
            let tx = TxCodec::decode_hex(&tx)?;
            dispatch(&store, &config, tx, false).await?;
        }
        Commands::Show { id } => {
            let engine = load_engine(&store, &config)?;
            let proposal = engine.proposal(id).map_err(NodeError::from)?;
            let now = SystemClock.now();
            println!("Proposal #{}", proposal.id());
            println!("  description: {}", proposal.description());
            println!("  window:      [{}, {})", proposal.start_time(), proposal.end_time());
            println!("  yes / no:    {} / {}", proposal.yes_votes(), proposal.no_votes());
            println!("  finalized:   {}", proposal.is_finalized());
            println!("  state:       {:?}", proposal.state(now));
        }
        Commands::NextId => {
            let engine = load_engine(&store, &config)?;
            println!("{}", engine.next_proposal_id());
        }
        Commands::Events { since } => {
            let engine = load_engine(&store, &config)?;
            for record in engine.events_since(since) {
                println!("{}", format_event(record));
            }
        }
        Commands::Stats => {
            let stats = store.stats()?;
            println!("keys:        {}", stats.key_count);
            println!("disk bytes:  {}", stats.disk_size_bytes);
            println!("applied txs: {}", store.load_processed()?.len());
            if let Some(engine) = store.load_engine()? {
                println!("holders:     {}", engine.ledger().holder_count());
                println!("proposals:   {}", engine.next_proposal_id());
                println!("events:      {}", engine.events().len());
            }
        }
    }

    Ok(())
}

fn load_engine(store: &GovernanceStore, config: &NodeConfig) -> Result<VotingEngine, CliError> {
    store
        .load_engine()?
        .ok_or_else(|| CliError::NotInitialized(config.data_dir.clone()))
}

fn load_keypair(store: &GovernanceStore, label: &str) -> Result<Keypair, CliError> {
    store
        .load_keypair_with_label(label)?
        .ok_or_else(|| CliError::UnknownLabel(label.to_string()))
}

/// An `0x...` address, or the address of a stored key label
fn resolve_account(store: &GovernanceStore, account: &str) -> Result<Address, CliError> {
    match Address::parse(account) {
        Ok(address) => Ok(address),
        Err(_) => Ok(load_keypair(store, account)?.address()),
    }
}

/// Print the transaction, or run it through a node backed by the store
async fn dispatch(
    store: &GovernanceStore,
    config: &NodeConfig,
    tx: SignedTransaction,
    dry_run: bool,
) -> Result<(), CliError> {
    if dry_run {
        println!("{}", TxCodec::encode_hex(&tx)?);
        return Ok(());
    }

    let engine = load_engine(store, config)?;
    let mut node = GovernanceNode::new(engine, SystemClock);
    if config.persist {
        node = node.with_store(store.clone())?;
    } else {
        println!("(not persisted)");
    }
    let handle = node.spawn(config.queue_capacity);

    let pending = handle.submit(tx).await?;
    debug!(tx_id = %pending.id(), "transaction queued");
    let result = pending.wait().await;
    handle.shutdown().await?;

    print_receipt(&result?);
    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    match &receipt.output {
        TxOutput::Transferred(ok) => println!("Transfer succeeded: {}", ok),
        TxOutput::ProposalCreated(id) => println!("Created proposal with id: {}", id),
        TxOutput::Voted { weight } => println!("Voted with weight {}", weight),
        TxOutput::Finalized(outcome) => println!(
            "Finalized: {} (yes {}, no {})",
            if outcome.passed { "passed" } else { "failed" },
            outcome.yes_votes,
            outcome.no_votes
        ),
    }
    println!("tx {} at {}", receipt.tx_id, receipt.timestamp);
    for record in &receipt.events {
        println!("  {}", format_event(record));
    }
}

fn format_event(record: &EventRecord) -> String {
    let detail = match &record.event {
        Event::ProposalCreated {
            id,
            proposer,
            description,
            start_time,
            end_time,
        } => format!("id={} proposer={} [{}, {}) \"{}\"", id, proposer, start_time, end_time, description),
        Event::VoteCast {
            proposal_id,
            voter,
            support,
            weight,
        } => format!("id={} voter={} support={} weight={}", proposal_id, voter, support, weight),
        Event::ProposalFinalized {
            proposal_id,
            passed,
            yes_votes,
            no_votes,
        } => format!("id={} passed={} yes={} no={}", proposal_id, passed, yes_votes, no_votes),
        Event::Transfer { from, to, amount } => format!("from={} to={} amount={}", from, to, amount),
    };
    format!("#{} {} {}", record.seq, record.event.name(), detail)
}
