// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

#![allow(clippy::panic)]

use bulwark::SafetyError;
use bulwark_example_types::vertex_types::TestVertex;
use bulwark_testing::{
    helpers::{build_test_node, random_vertex},
    view_generator::TestVertexGenerator,
};
use bulwark_types::{consensus::SafetyState, data::ViewNumber, vote::HasViewNumber};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn test_restart_without_record_starts_from_genesis() {
    let node = build_test_node(0).restart().unwrap();
    assert_eq!(node.rules.state(), &SafetyState::initial());
}

#[test]
fn test_restart_reloads_last_vote_and_lock() {
    let mut node = build_test_node(0);
    let mut generator = TestVertexGenerator::generate();
    for vertex in generator.by_ref().take(4) {
        node.vote(&vertex).unwrap();
    }
    let state = node.rules.state().clone();

    let mut node = node.restart().unwrap();
    assert_eq!(node.rules.state(), &state);
    assert_eq!(
        node.rules
            .last_vote(ViewNumber::new(4))
            .map(HasViewNumber::view_number),
        Some(ViewNumber::new(4))
    );

    // Neither the last view nor a branch below the lock is votable after the restart
    assert!(node.vote(&TestVertex::chain(4, 3, 2)).unwrap().is_none());
    assert!(node.vote(&TestVertex::chain(5, 2, 1)).unwrap().is_none());
    assert!(node.vote(&generator.next().unwrap()).unwrap().is_some());
}

#[test]
fn test_restart_keeps_timeout() {
    let mut node = build_test_node(0);
    let vote = node
        .vote(&TestVertex::genesis_child(1))
        .unwrap()
        .expect("first vote is safe");
    let timed_out = node.rules.timeout_vote(vote.clone()).unwrap();

    let mut node = node.restart().unwrap();
    assert_eq!(node.rules.last_vote(ViewNumber::new(1)), Some(&timed_out));

    let signatures = node.signer.signatures();
    assert_eq!(node.rules.timeout_vote(vote).unwrap(), timed_out);
    assert_eq!(node.signer.signatures(), signatures);
}

#[test]
fn test_restart_fails_when_record_is_unreadable() {
    let mut node = build_test_node(0);
    node.vote(&TestVertex::genesis_child(1)).unwrap();

    node.storage.set_should_return_err(true);
    assert!(matches!(node.restart(), Err(SafetyError::Persistence(_))));
}

#[test]
fn test_crashing_node_behaves_like_running_node() {
    let mut rng = StdRng::seed_from_u64(0xc2a5);
    for _ in 0..10 {
        let mut crashing = build_test_node(3);
        let mut running = build_test_node(3);

        for _ in 0..60 {
            if rng.gen_bool(0.25) {
                crashing = crashing.restart().unwrap();
                let crashed_state = crashing.rules.state();
                let running_state = running.rules.state();
                assert_eq!(crashed_state.last_voted_view(), running_state.last_voted_view());
                assert_eq!(crashed_state.locked_view(), running_state.locked_view());
                assert_eq!(
                    crashed_state
                        .last_vote()
                        .map(|vote| (vote.vote_data(), vote.is_timeout())),
                    running_state
                        .last_vote()
                        .map(|vote| (vote.vote_data(), vote.is_timeout()))
                );
            }

            let vertex = random_vertex(&mut rng, 50);
            let crashed_vote = crashing.vote(&vertex).unwrap();
            let running_vote = running.vote(&vertex).unwrap();
            assert_eq!(
                crashed_vote.as_ref().map(|vote| vote.vote_data()),
                running_vote.as_ref().map(|vote| vote.vote_data())
            );

            if rng.gen_bool(0.1) {
                if let (Some(crashed_vote), Some(running_vote)) = (crashed_vote, running_vote) {
                    crashing.rules.timeout_vote(crashed_vote).unwrap();
                    running.rules.timeout_vote(running_vote).unwrap();
                }
            }
        }
    }
}
