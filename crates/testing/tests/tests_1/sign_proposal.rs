// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

#![allow(clippy::panic)]

use bulwark::SafetyError;
use bulwark_example_types::vertex_types::{genesis_high_qc, header, TestVertex};
use bulwark_testing::{helpers::build_test_node, view_generator::TestVertexGenerator};
use bulwark_types::{
    data::ViewNumber,
    traits::{SignatureKey, Vertex},
    vote::HasViewNumber,
};

#[test]
fn test_leader_signs_vertex_extending_lock() {
    let mut node = build_test_node(4);
    let mut generator = TestVertexGenerator::generate();
    for vertex in generator.by_ref().take(3) {
        node.vote(&vertex).unwrap();
    }
    let state = node.rules.state().clone();
    let committed_qc = generator.current_vertex.as_ref().unwrap().certificate();

    let vertex = generator.next().unwrap();
    let proposal = node
        .rules
        .sign_proposal(&vertex, &committed_qc)
        .unwrap()
        .expect("vertex extends the locked branch");

    assert_eq!(proposal.vertex_id, *vertex.id());
    assert_eq!(proposal.view_number(), ViewNumber::new(4));
    assert_eq!(proposal.highest_committed_qc, committed_qc);
    assert!(node
        .rules
        .public_key()
        .validate(&proposal.signature, vertex.id().as_ref()));
    assert_eq!(node.rules.state(), &state);
}

#[test]
fn test_leader_refuses_vertex_below_lock() {
    let mut node = build_test_node(4);
    for vertex in TestVertexGenerator::generate().take(3) {
        node.vote(&vertex).unwrap();
    }

    let stale = TestVertex::chain(4, 1, 0);
    let highest_committed_qc = genesis_high_qc().highest_committed_qc().clone();
    assert!(node
        .rules
        .sign_proposal(&stale, &highest_committed_qc)
        .unwrap()
        .is_none());
}

#[test]
fn test_proposal_signing_failure_is_reported() {
    let node = build_test_node(4);
    node.signer.set_should_return_err(true);

    let highest_committed_qc = genesis_high_qc().highest_committed_qc().clone();
    assert!(matches!(
        node.rules
            .sign_proposal(&TestVertex::genesis_child(1), &highest_committed_qc),
        Err(SafetyError::Signing { what: "proposal", .. })
    ));
}

#[test]
fn test_leader_rejects_malformed_vertex() {
    let node = build_test_node(4);
    let highest_committed_qc = genesis_high_qc().highest_committed_qc().clone();

    let parent_not_below = TestVertex::builder(3)
        .parent(header(3))
        .grandparent(header(2))
        .build();
    assert!(matches!(
        node.rules.sign_proposal(&parent_not_below, &highest_committed_qc),
        Err(SafetyError::MalformedVertex { .. })
    ));

    let grandparent_above = TestVertex::builder(5)
        .parent(header(3))
        .grandparent(header(4))
        .build();
    assert!(matches!(
        node.rules.sign_proposal(&grandparent_above, &highest_committed_qc),
        Err(SafetyError::MalformedVertex { .. })
    ));
    assert_eq!(node.signer.signatures(), 0);
}
