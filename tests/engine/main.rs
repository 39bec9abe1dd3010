// Voting engine integration tests

mod voting_test;
