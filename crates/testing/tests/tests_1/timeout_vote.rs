// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

#![allow(clippy::panic)]

use bulwark::SafetyError;
use bulwark_example_types::vertex_types::TestVertex;
use bulwark_testing::helpers::{build_test_node, TestNode};
use bulwark_types::{
    data::ViewNumber,
    signature_key::BLSPubKey,
    traits::SignatureKey,
    vote::{HasViewNumber, TimeoutData, Vote},
};
use committable::Committable;

/// A node that voted in views 1 to 3, and the vote of view 3
fn voted_node() -> (TestNode, Vote<BLSPubKey>) {
    let mut node = build_test_node(2);
    node.vote(&TestVertex::genesis_child(1)).unwrap();
    node.vote(&TestVertex::chain(2, 1, 0)).unwrap();
    let vote = node
        .vote(&TestVertex::chain(3, 2, 1))
        .unwrap()
        .expect("chain votes are safe");
    (node, vote)
}

#[test]
fn test_timeout_keeps_views() {
    let (mut node, vote) = voted_node();
    let before = node.rules.state().clone();

    let timeout_vote = node.rules.timeout_vote(vote.clone()).unwrap();

    assert!(timeout_vote.is_timeout());
    assert!(timeout_vote.is_signature_valid());
    assert_eq!(timeout_vote.without_timeout_signature(), vote);
    assert_eq!(
        TimeoutData::of(&timeout_vote),
        TimeoutData {
            epoch: vote.epoch(),
            view: ViewNumber::new(3),
        }
    );
    assert!(node.rules.public_key().validate(
        timeout_vote.timeout_signature().unwrap(),
        TimeoutData::of(&vote).commit().as_ref()
    ));

    let state = node.rules.state();
    assert_eq!(state.last_voted_view(), before.last_voted_view());
    assert_eq!(state.locked_view(), before.locked_view());
    assert_eq!(state.last_vote(), Some(&timeout_vote));
    assert_eq!(node.storage.stored().as_ref(), Some(state));
    assert_eq!(node.rules.last_vote(ViewNumber::new(3)), Some(&timeout_vote));
}

#[test]
fn test_timeout_is_idempotent() {
    let (mut node, vote) = voted_node();

    let first = node.rules.timeout_vote(vote.clone()).unwrap();
    let signatures = node.signer.signatures();
    let stores = node.storage.stores();
    let state = node.rules.state().clone();

    let again = node.rules.timeout_vote(first.clone()).unwrap();
    let repeated = node.rules.timeout_vote(vote).unwrap();

    assert_eq!(again, first);
    assert_eq!(repeated, first);
    assert_eq!(node.signer.signatures(), signatures);
    assert_eq!(node.storage.stores(), stores);
    assert_eq!(node.rules.state(), &state);
}

#[test]
fn test_timeout_of_timed_out_vote_is_returned_unchanged() {
    let (mut node, vote) = voted_node();
    let timed_out = node.rules.timeout_vote(vote).unwrap();

    let mut other = build_test_node(2);
    let signatures = other.signer.signatures();
    assert_eq!(other.rules.timeout_vote(timed_out.clone()).unwrap(), timed_out);
    assert_eq!(other.signer.signatures(), signatures);
    assert_eq!(other.storage.stores(), 0);
}

#[test]
fn test_timeout_does_not_unlock_voting() {
    let (mut node, vote) = voted_node();
    node.rules.timeout_vote(vote).unwrap();

    assert!(node.vote(&TestVertex::chain(3, 2, 1)).unwrap().is_none());
    let next = node
        .vote(&TestVertex::chain(4, 3, 2))
        .unwrap()
        .expect("next view is votable");
    assert_eq!(next.view_number(), ViewNumber::new(4));
    assert!(!next.is_timeout());
    assert_eq!(node.rules.last_vote(ViewNumber::new(3)), None);
}

#[test]
fn test_timeout_signing_failure_leaves_state_unchanged() {
    let (mut node, vote) = voted_node();
    let state = node.rules.state().clone();
    let stores = node.storage.stores();

    node.signer.set_should_return_err(true);
    assert!(matches!(
        node.rules.timeout_vote(vote.clone()),
        Err(SafetyError::Signing { what: "timeout", .. })
    ));
    assert_eq!(node.rules.state(), &state);
    assert_eq!(node.storage.stores(), stores);

    node.signer.set_should_return_err(false);
    assert!(node.rules.timeout_vote(vote).unwrap().is_timeout());
}

#[test]
fn test_timeout_of_another_validators_vote_is_refused() {
    let (mut author, vote) = voted_node();
    let mut node = build_test_node(3);
    let state = node.rules.state().clone();
    let signatures = node.signer.signatures();

    let returned = node.rules.timeout_vote(vote.clone()).unwrap();

    assert_eq!(returned, vote);
    assert!(!returned.is_timeout());
    assert_eq!(node.rules.state(), &state);
    assert_eq!(node.signer.signatures(), signatures);
    assert_eq!(node.storage.stores(), 0);
    assert!(author.rules.timeout_vote(vote).unwrap().is_timeout());
}

#[test]
fn test_timeout_of_vote_before_last_voted_view_is_refused() {
    let mut node = build_test_node(2);
    let old = node
        .vote(&TestVertex::genesis_child(1))
        .unwrap()
        .expect("first vote is safe");
    node.vote(&TestVertex::chain(2, 1, 0)).unwrap();
    let state = node.rules.state().clone();
    let stores = node.storage.stores();

    let returned = node.rules.timeout_vote(old.clone()).unwrap();

    assert_eq!(returned, old);
    assert_eq!(node.rules.state(), &state);
    assert_eq!(node.storage.stores(), stores);
    assert_eq!(
        node.rules.last_vote(ViewNumber::new(2)).map(HasViewNumber::view_number),
        Some(ViewNumber::new(2))
    );
}
