// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

#![allow(clippy::panic)]

use bulwark::helpers::commit_candidate;
use bulwark_example_types::vertex_types::{header, TestVertex};
use bulwark_testing::helpers::{build_test_node, random_vertex};
use bulwark_types::traits::Vertex;
use rand::{rngs::StdRng, SeedableRng};

/// A well-formed vertex at view 10 with the given chain shape
fn shaped_vertex(
    touches_genesis: bool,
    has_direct_parent: bool,
    parent_has_direct_parent: bool,
) -> TestVertex {
    let parent_view = if has_direct_parent { 9 } else { 8 };
    let grandparent_view = if parent_has_direct_parent {
        parent_view - 1
    } else {
        parent_view - 2
    };
    TestVertex::builder(10)
        .parent(header(parent_view))
        .grandparent(header(grandparent_view))
        .touches_genesis(touches_genesis)
        .build()
}

#[test]
fn test_commit_rule_over_every_chain_shape() {
    for touches_genesis in [false, true] {
        for has_direct_parent in [false, true] {
            for parent_has_direct_parent in [false, true] {
                let vertex = shaped_vertex(touches_genesis, has_direct_parent, parent_has_direct_parent);
                assert_eq!(vertex.has_direct_parent(), has_direct_parent);
                assert_eq!(vertex.parent_has_direct_parent(), parent_has_direct_parent);

                let mut node = build_test_node(0);
                let vote = node
                    .vote(&vertex)
                    .unwrap()
                    .expect("fresh validator votes");

                let commits = !touches_genesis && has_direct_parent && parent_has_direct_parent;
                assert_eq!(
                    vote.vote_data().committed(),
                    commits.then_some(vertex.grandparent_header()),
                    "touches_genesis={touches_genesis} has_direct_parent={has_direct_parent} \
                     parent_has_direct_parent={parent_has_direct_parent}"
                );
            }
        }
    }
}

#[test]
fn test_votes_commit_exactly_what_the_rule_selects() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let vertex = random_vertex(&mut rng, 30);
        let mut node = build_test_node(1);
        let vote = node
            .vote(&vertex)
            .unwrap()
            .expect("fresh validator votes");
        assert_eq!(vote.vote_data().committed(), commit_candidate(&vertex).as_ref());
    }
}
