// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

#![allow(clippy::panic)]

use std::{fs, path::Path, sync::Arc};

use bulwark::{traits::FileStorage, SafetyRules};
use bulwark_example_types::{
    metrics_types::TestMetrics,
    vertex_types::{genesis_high_qc, TestVertex},
};
use bulwark_testing::{
    helpers::{build_test_node, key_pair_for_id, timestamp_for, FileSafetyRules},
    view_generator::TestVertexGenerator,
};
use bulwark_types::{
    consensus::SafetyMetricsValue,
    traits::{signer::KeyPairSigner, Vertex},
};

#[test]
fn test_votes_refusals_and_saves_are_counted() {
    let metrics = TestMetrics::default();
    let mut node = build_test_node(0);
    node.rules = node
        .rules
        .with_metrics(Arc::new(SafetyMetricsValue::new(&metrics)));
    assert_eq!(metrics.gauge("last_voted_view"), Some(0));

    let mut votes = Vec::new();
    for vertex in TestVertexGenerator::generate().take(3) {
        votes.push(node.vote(&vertex).unwrap().expect("chain votes are safe"));
    }
    assert!(node.vote(&TestVertex::chain(3, 2, 1)).unwrap().is_none());
    assert!(node.vote(&TestVertex::chain(4, 0, 0)).unwrap().is_none());
    node.rules.timeout_vote(votes[2].clone()).unwrap();

    assert_eq!(metrics.counter("votes"), 3);
    assert_eq!(metrics.counter("refusals"), 2);
    assert_eq!(metrics.counter("timeouts"), 1);
    assert_eq!(metrics.counter("safety_store_saves"), 4);
    assert_eq!(metrics.histogram("safety_store_time").len(), 4);
    assert_eq!(metrics.gauge("last_voted_view"), Some(3));
    assert_eq!(metrics.gauge("locked_view"), Some(2));
}

#[test]
fn test_failed_store_is_timed_but_not_counted() {
    let metrics = TestMetrics::default();
    let mut node = build_test_node(0);
    node.rules = node
        .rules
        .with_metrics(Arc::new(SafetyMetricsValue::new(&metrics)));

    node.storage.set_should_return_err(true);
    assert!(node.vote(&TestVertex::genesis_child(1)).is_err());

    assert_eq!(metrics.counter("votes"), 0);
    assert_eq!(metrics.counter("safety_store_saves"), 0);
    assert_eq!(metrics.histogram("safety_store_time").len(), 1);
    assert_eq!(metrics.gauge("last_voted_view"), Some(0));
}

/// Rules over a file store in `dir`, both reporting to `metrics`
fn file_rules_with_metrics(dir: &Path, metrics: &Arc<SafetyMetricsValue>) -> FileSafetyRules {
    let (private_key, public_key) = key_pair_for_id(0);
    let storage = FileStorage::open(dir, false)
        .unwrap()
        .with_metrics(Arc::clone(metrics));
    SafetyRules::load(public_key, storage, KeyPairSigner::new(private_key))
        .unwrap()
        .with_metrics(Arc::clone(metrics))
}

#[test]
fn test_file_store_counts_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = TestMetrics::default();
    let safety_metrics = Arc::new(SafetyMetricsValue::new(&metrics));

    let mut rules = file_rules_with_metrics(dir.path(), &safety_metrics);
    for vertex in TestVertexGenerator::generate().take(2) {
        rules
            .vote_for(
                &vertex,
                vertex.proposed_header(),
                timestamp_for(vertex.view()),
                &genesis_high_qc(),
            )
            .unwrap()
            .expect("chain votes are safe");
    }
    drop(rules);

    let record = fs::metadata(dir.path().join("safety_state.bin")).unwrap().len();
    let written = metrics.counter("safety_store_bytes_written");
    assert!(written > usize::try_from(record).unwrap());
    assert_eq!(metrics.counter("safety_store_bytes_read"), 0);

    let reloaded = file_rules_with_metrics(dir.path(), &safety_metrics);
    assert_eq!(
        metrics.counter("safety_store_bytes_read"),
        usize::try_from(record).unwrap()
    );
    assert_eq!(metrics.gauge("last_voted_view"), Some(2));
    assert_eq!(reloaded.state().last_voted_view().u64(), 2);
}
