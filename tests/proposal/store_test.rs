// Proposal store tests: creation, vote recording and finalization

use dao_voting::identity::{Address, Keypair};
use dao_voting::proposal::{ProposalError, ProposalState, ProposalStore};

fn voter() -> Address {
    Keypair::generate().address()
}

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn test_create_assigns_gap_free_ids() {
    let mut store = ProposalStore::new();

    for expected in 0..10u64 {
        assert_eq!(store.next_id(), expected);
        let id = store.create(format!("proposal {}", expected), 60, expected * 5).unwrap();
        assert_eq!(id, expected);
    }
    assert_eq!(store.next_id(), 10);
    assert_eq!(store.len(), 10);
}

#[test]
fn test_create_with_zero_period_fails() {
    let mut store = ProposalStore::new();

    assert_eq!(store.create("no period".into(), 0, 0), Err(ProposalError::InvalidPeriod(0)));
    assert_eq!(store.next_id(), 0);
    assert!(store.is_empty());
}

#[test]
fn test_created_proposal_fields() {
    let mut store = ProposalStore::new();
    let id = store.create("Test proposal".into(), 60, 1_000).unwrap();
    let proposal = store.get(id).unwrap();

    assert_eq!(proposal.id(), id);
    assert_eq!(proposal.description(), "Test proposal");
    assert_eq!(proposal.start_time(), 1_000);
    assert_eq!(proposal.end_time(), 1_060);
    assert_eq!(proposal.yes_votes(), 0);
    assert_eq!(proposal.no_votes(), 0);
    assert!(!proposal.is_finalized());
}

#[test]
fn test_get_unknown_id() {
    let store = ProposalStore::new();
    assert_eq!(store.get(999).unwrap_err(), ProposalError::NotFound(999));
}

// ============================================================================
// VOTING
// ============================================================================

#[test]
fn test_vote_on_unknown_proposal() {
    let mut store = ProposalStore::new();
    assert_eq!(
        store.record_vote(999, &voter(), true, 10, 0),
        Err(ProposalError::NotFound(999))
    );
}

#[test]
fn test_vote_window_is_half_open() {
    let mut store = ProposalStore::new();
    let id = store.create("window".into(), 60, 100).unwrap();

    assert!(matches!(
        store.record_vote(id, &voter(), true, 1, 99),
        Err(ProposalError::NotActive { .. })
    ));
    assert!(store.record_vote(id, &voter(), true, 1, 100).is_ok());
    assert!(store.record_vote(id, &voter(), true, 1, 159).is_ok());
    assert!(matches!(
        store.record_vote(id, &voter(), true, 1, 160),
        Err(ProposalError::NotActive { .. })
    ));

    assert_eq!(store.get(id).unwrap().yes_votes(), 2);
}

#[test]
fn test_not_active_checked_before_voting_power() {
    let mut store = ProposalStore::new();
    let id = store.create("order".into(), 60, 0).unwrap();

    assert!(matches!(
        store.record_vote(id, &voter(), true, 0, 60),
        Err(ProposalError::NotActive { .. })
    ));
}

#[test]
fn test_zero_weight_has_no_voting_power() {
    let mut store = ProposalStore::new();
    let id = store.create("zero".into(), 60, 0).unwrap();
    let account = voter();

    assert_eq!(store.record_vote(id, &account, true, 0, 1), Err(ProposalError::NoVotingPower));
    assert!(!store.has_voted(id, &account));
}

#[test]
fn test_second_vote_rejected_and_tally_unchanged() {
    let mut store = ProposalStore::new();
    let id = store.create("double".into(), 60, 0).unwrap();
    let account = voter();

    store.record_vote(id, &account, true, 40, 1).unwrap();
    assert_eq!(
        store.record_vote(id, &account, false, 40, 2),
        Err(ProposalError::AlreadyVoted(id))
    );

    let proposal = store.get(id).unwrap();
    assert_eq!(proposal.yes_votes(), 40);
    assert_eq!(proposal.no_votes(), 0);
}

#[test]
fn test_receipts_are_per_proposal() {
    let mut store = ProposalStore::new();
    let first = store.create("one".into(), 60, 0).unwrap();
    let second = store.create("two".into(), 60, 0).unwrap();
    let account = voter();

    store.record_vote(first, &account, true, 10, 1).unwrap();
    store.record_vote(second, &account, false, 10, 1).unwrap();

    assert!(store.has_voted(first, &account));
    assert!(store.has_voted(second, &account));
    let receipt = store.receipt(second, &account).unwrap();
    assert!(!receipt.support);
    assert_eq!(receipt.weight, 10);
}

#[test]
fn test_tally_equals_sum_of_receipt_weights() {
    let mut store = ProposalStore::new();
    let id = store.create("sum".into(), 600, 0).unwrap();

    for i in 1..=20u64 {
        store.record_vote(id, &voter(), i % 3 == 0, i * 11, i).unwrap();
    }

    let proposal = store.get(id).unwrap();
    let receipt_total: u64 = store.receipts_for(id).map(|(_, r)| r.weight).sum();
    let yes_total: u64 = store.receipts_for(id).filter(|(_, r)| r.support).map(|(_, r)| r.weight).sum();

    assert_eq!(proposal.yes_votes() + proposal.no_votes(), receipt_total);
    assert_eq!(proposal.yes_votes(), yes_total);
}

#[test]
fn test_tally_overflow_rejected_atomically() {
    let mut store = ProposalStore::new();
    let id = store.create("overflow".into(), 60, 0).unwrap();
    let late = voter();

    store.record_vote(id, &voter(), true, u64::MAX, 1).unwrap();
    assert_eq!(store.record_vote(id, &late, true, 1, 2), Err(ProposalError::TallyOverflow(id)));
    assert!(!store.has_voted(id, &late));
    assert_eq!(store.get(id).unwrap().yes_votes(), u64::MAX);
}

// ============================================================================
// FINALIZATION
// ============================================================================

#[test]
fn test_finalize_before_end() {
    let mut store = ProposalStore::new();
    let id = store.create("early".into(), 60, 0).unwrap();

    assert!(matches!(
        store.finalize(id, 59),
        Err(ProposalError::VotingNotEnded { end_time: 60, now: 59, .. })
    ));
    assert!(!store.get(id).unwrap().is_finalized());
}

#[test]
fn test_finalize_exactly_at_end() {
    let mut store = ProposalStore::new();
    let id = store.create("boundary".into(), 60, 0).unwrap();

    let outcome = store.finalize(id, 60).unwrap();
    assert!(!outcome.passed);
    assert_eq!(store.get(id).unwrap().state(60), ProposalState::Finalized);
}

#[test]
fn test_finalize_twice() {
    let mut store = ProposalStore::new();
    let id = store.create("twice".into(), 60, 0).unwrap();

    store.finalize(id, 120).unwrap();
    assert_eq!(store.finalize(id, 121), Err(ProposalError::AlreadyFinalized(id)));
}

#[test]
fn test_finalize_unknown() {
    let mut store = ProposalStore::new();
    assert_eq!(store.finalize(999, 0), Err(ProposalError::NotFound(999)));
}

#[test]
fn test_finalize_outcomes() {
    let mut store = ProposalStore::new();
    let passing = store.create("passing".into(), 60, 0).unwrap();
    let failing = store.create("failing".into(), 60, 0).unwrap();
    let tied = store.create("tied".into(), 60, 0).unwrap();

    store.record_vote(passing, &voter(), true, 6, 1).unwrap();
    store.record_vote(passing, &voter(), false, 5, 1).unwrap();
    store.record_vote(failing, &voter(), true, 5, 1).unwrap();
    store.record_vote(failing, &voter(), false, 6, 1).unwrap();
    store.record_vote(tied, &voter(), true, 5, 1).unwrap();
    store.record_vote(tied, &voter(), false, 5, 1).unwrap();

    assert!(store.finalize(passing, 60).unwrap().passed);
    assert!(!store.finalize(failing, 60).unwrap().passed);

    let tie = store.finalize(tied, 60).unwrap();
    assert!(!tie.passed);
    assert_eq!((tie.yes_votes, tie.no_votes), (5, 5));
}

#[test]
fn test_no_votes_after_finalize() {
    let mut store = ProposalStore::new();
    let id = store.create("closed".into(), 60, 0).unwrap();
    store.finalize(id, 60).unwrap();

    assert!(matches!(
        store.record_vote(id, &voter(), true, 1, 61),
        Err(ProposalError::NotActive { .. })
    ));
}

#[test]
fn test_finalized_rejects_votes_inside_window() {
    let mut store = ProposalStore::new();
    let id = store.create("rewound clock".into(), 60, 0).unwrap();
    store.record_vote(id, &voter(), true, 10, 5).unwrap();
    store.finalize(id, 60).unwrap();

    let result = store.record_vote(id, &voter(), true, 1_000, 30);

    assert_eq!(
        result,
        Err(ProposalError::NotActive {
            id,
            start_time: 0,
            end_time: 60,
            now: 30
        })
    );
    let proposal = store.get(id).unwrap();
    assert_eq!((proposal.yes_votes(), proposal.no_votes()), (10, 0));
    assert_eq!(proposal.state(30), ProposalState::Finalized);
}
