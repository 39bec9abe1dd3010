// Voting engine tests: orchestration, events and failure atomicity

use dao_voting::engine::{ErrorKind, GovernanceError, VotingEngine};
use dao_voting::events::Event;
use dao_voting::identity::{Address, Keypair};
use dao_voting::ledger::LedgerError;
use dao_voting::proposal::ProposalError;

fn account() -> Address {
    Keypair::generate().address()
}

fn engine_with_holder(supply: u64) -> (VotingEngine, Address) {
    let holder = account();
    (VotingEngine::new(holder, supply), holder)
}

// ============================================================================
// CREATE
// ============================================================================

#[test]
fn test_next_proposal_id_increments_by_one() {
    let (mut engine, holder) = engine_with_holder(100);

    for expected in 0..8u64 {
        assert_eq!(engine.next_proposal_id(), expected);
        engine.create_proposal(&holder, "item", 60, 0).unwrap();
    }
    assert_eq!(engine.next_proposal_id(), 8);
}

#[test]
fn test_create_emits_proposal_created() {
    let (mut engine, holder) = engine_with_holder(100);

    let id = engine.create_proposal(&holder, "Update DAO parameters", 60, 1_000).unwrap();

    let record = engine.events().last().unwrap();
    assert_eq!(
        record.event,
        Event::ProposalCreated {
            id,
            proposer: holder,
            description: "Update DAO parameters".to_string(),
            start_time: 1_000,
            end_time: 1_060,
        }
    );
}

#[test]
fn test_any_account_may_create() {
    let (mut engine, _) = engine_with_holder(100);
    let nobody = account();

    assert_eq!(engine.create_proposal(&nobody, "from zero balance", 60, 0).unwrap(), 0);
}

#[test]
fn test_invalid_period_changes_nothing() {
    let (mut engine, holder) = engine_with_holder(100);

    let err = engine.create_proposal(&holder, "No period", 0, 0).unwrap_err();

    assert_eq!(err, GovernanceError::Proposal(ProposalError::InvalidPeriod(0)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(engine.next_proposal_id(), 0);
    assert!(engine.events().is_empty());
}

// ============================================================================
// VOTE
// ============================================================================

#[test]
fn test_vote_weight_is_balance() {
    let (mut engine, holder) = engine_with_holder(1_000);
    let id = engine.create_proposal(&holder, "weight", 60, 0).unwrap();

    let weight = engine.vote(&holder, id, true, 10).unwrap();

    assert_eq!(weight, 1_000);
    assert_eq!(engine.proposal(id).unwrap().yes_votes(), 1_000);
    assert_eq!(
        engine.events().last().unwrap().event,
        Event::VoteCast {
            proposal_id: id,
            voter: holder,
            support: true,
            weight: 1_000,
        }
    );
}

#[test]
fn test_vote_on_unknown_proposal() {
    let (mut engine, holder) = engine_with_holder(100);

    let err = engine.vote(&holder, 999, true, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_vote_outside_window_leaves_tallies() {
    let (mut engine, holder) = engine_with_holder(100);
    let id = engine.create_proposal(&holder, "window", 60, 100).unwrap();
    let events_before = engine.events().len();

    let early = engine.vote(&holder, id, true, 99).unwrap_err();
    let late = engine.vote(&holder, id, true, 160).unwrap_err();

    assert_eq!(early.kind(), ErrorKind::State);
    assert_eq!(late.kind(), ErrorKind::State);
    let proposal = engine.proposal(id).unwrap();
    assert_eq!(proposal.yes_votes() + proposal.no_votes(), 0);
    assert!(!engine.has_voted(id, &holder));
    assert_eq!(engine.events().len(), events_before);
}

#[test]
fn test_double_vote_rejected() {
    let (mut engine, holder) = engine_with_holder(100);
    let id = engine.create_proposal(&holder, "Double vote test", 60, 0).unwrap();

    engine.vote(&holder, id, true, 1).unwrap();
    let err = engine.vote(&holder, id, false, 2).unwrap_err();

    assert_eq!(err, GovernanceError::Proposal(ProposalError::AlreadyVoted(id)));
    assert_eq!(err.kind(), ErrorKind::State);
    let proposal = engine.proposal(id).unwrap();
    assert_eq!((proposal.yes_votes(), proposal.no_votes()), (100, 0));
}

#[test]
fn test_zero_balance_has_no_voting_power() {
    let (mut engine, holder) = engine_with_holder(100);
    let id = engine.create_proposal(&holder, "Zero balance test", 60, 0).unwrap();

    let err = engine.vote(&account(), id, true, 1).unwrap_err();

    assert_eq!(err, GovernanceError::Proposal(ProposalError::NoVotingPower));
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn test_tally_matches_vote_events() {
    let (mut engine, holder) = engine_with_holder(10_000);
    let voters: Vec<Address> = (0..6).map(|_| account()).collect();
    for (i, voter) in voters.iter().enumerate() {
        engine.transfer(&holder, voter, 100 * (i as u64 + 1)).unwrap();
    }
    let id = engine.create_proposal(&holder, "sum", 60, 0).unwrap();

    for (i, voter) in voters.iter().enumerate() {
        engine.vote(voter, id, i % 2 == 0, 5).unwrap();
    }
    // Rejected attempts must not disturb the sum.
    let _ = engine.vote(&voters[0], id, true, 6);
    let _ = engine.vote(&account(), id, true, 6);

    let recorded: u64 = engine
        .events()
        .for_proposal(id)
        .iter()
        .filter_map(|r| match r.event {
            Event::VoteCast { weight, .. } => Some(weight),
            _ => None,
        })
        .sum();
    let proposal = engine.proposal(id).unwrap();
    assert_eq!(proposal.yes_votes() + proposal.no_votes(), recorded);
    assert_eq!(recorded, 2_100);
}

// ============================================================================
// FINALIZE
// ============================================================================

#[test]
fn test_finalize_emits_outcome() {
    let (mut engine, holder) = engine_with_holder(100);
    let id = engine.create_proposal(&holder, "pass", 60, 0).unwrap();
    engine.vote(&holder, id, true, 1).unwrap();

    let outcome = engine.finalize(&account(), id, 60).unwrap();

    assert!(outcome.passed);
    assert_eq!(
        engine.events().last().unwrap().event,
        Event::ProposalFinalized {
            proposal_id: id,
            passed: true,
            yes_votes: 100,
            no_votes: 0,
        }
    );
    assert!(engine.proposal(id).unwrap().is_finalized());
}

#[test]
fn test_finalize_twice_emits_once() {
    let (mut engine, holder) = engine_with_holder(100);
    let id = engine.create_proposal(&holder, "Double finalize test", 60, 0).unwrap();
    engine.vote(&holder, id, true, 1).unwrap();

    engine.finalize(&holder, id, 120).unwrap();
    let err = engine.finalize(&holder, id, 121).unwrap_err();

    assert_eq!(err, GovernanceError::Proposal(ProposalError::AlreadyFinalized(id)));
    let finalized_events = engine
        .events()
        .iter()
        .filter(|r| matches!(r.event, Event::ProposalFinalized { .. }))
        .count();
    assert_eq!(finalized_events, 1);
}

#[test]
fn test_finalize_unknown_proposal() {
    let (mut engine, holder) = engine_with_holder(100);
    let err = engine.finalize(&holder, 999, 1_000).unwrap_err();
    assert_eq!(err, GovernanceError::Proposal(ProposalError::NotFound(999)));
}

#[test]
fn test_finalize_with_no_votes_fails_proposal() {
    let (mut engine, holder) = engine_with_holder(100);
    let id = engine.create_proposal(&holder, "silence", 60, 0).unwrap();

    let outcome = engine.finalize(&holder, id, 60).unwrap();
    assert!(!outcome.passed);
    assert_eq!((outcome.yes_votes, outcome.no_votes), (0, 0));
}

// ============================================================================
// TRANSFER
// ============================================================================

#[test]
fn test_transfer_emits_event_and_returns_true() {
    let (mut engine, holder) = engine_with_holder(100);
    let to = account();

    assert!(engine.transfer(&holder, &to, 30).unwrap());
    assert_eq!(engine.balance_of(&to), 30);
    assert_eq!(
        engine.events().last().unwrap().event,
        Event::Transfer {
            from: holder,
            to,
            amount: 30,
        }
    );
}

#[test]
fn test_failed_transfer_is_validation_error() {
    let (mut engine, holder) = engine_with_holder(100);

    let err = engine.transfer(&holder, &account(), 101).unwrap_err();

    assert_eq!(
        err,
        GovernanceError::Ledger(LedgerError::InsufficientBalance {
            available: 100,
            required: 101
        })
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(engine.events().is_empty());
    assert_eq!(engine.balance_of(&holder), 100);
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

#[test]
fn test_snapshot_preserves_everything() {
    let (mut engine, holder) = engine_with_holder(1_000);
    let other = account();
    engine.transfer(&holder, &other, 250).unwrap();
    let id = engine.create_proposal(&holder, "snapshot", 60, 0).unwrap();
    engine.vote(&other, id, false, 3).unwrap();

    let mut restored = VotingEngine::from_bytes(&engine.to_bytes().unwrap()).unwrap();

    assert_eq!(restored.balance_of(&other), 250);
    assert_eq!(restored.next_proposal_id(), 1);
    assert_eq!(restored.events().len(), engine.events().len());
    // Receipts survive, so the restored engine still refuses a second vote.
    assert!(restored.vote(&other, id, true, 4).is_err());
}

#[test]
fn test_garbage_snapshot_rejected() {
    assert!(VotingEngine::from_bytes(&[0xff, 0x01, 0x02]).is_err());
}
