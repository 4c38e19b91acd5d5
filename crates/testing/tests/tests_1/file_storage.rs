// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

#![allow(clippy::panic)]

use std::{fs, sync::Arc};

use bulwark::{traits::Vertex, SafetyError};
use bulwark_example_types::{
    metrics_types::TestMetrics,
    vertex_types::{genesis_high_qc, TestVertex},
};
use bulwark_testing::{
    helpers::{build_file_safety_rules, timestamp_for},
    view_generator::TestVertexGenerator,
};
use bulwark_types::{
    consensus::{SafetyMetricsValue, SafetyState}, data::ViewNumber, signature_key::BLSPubKey,
    traits::storage::StorageError, validator_config::SafetyConfigFile,
};

#[test]
fn test_file_backed_rules_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut generator = TestVertexGenerator::generate();

    let state = {
        let mut rules = build_file_safety_rules(0, dir.path()).unwrap();
        assert_eq!(rules.state(), &SafetyState::initial());
        for vertex in generator.by_ref().take(3) {
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
        rules.close().unwrap();
        rules.state().clone()
    };

    let mut rules = build_file_safety_rules(0, dir.path()).unwrap();
    assert_eq!(rules.state(), &state);
    assert_eq!(rules.state().last_voted_view(), ViewNumber::new(3));
    assert_eq!(rules.state().locked_view(), ViewNumber::new(2));

    let revote = TestVertex::chain(3, 2, 1);
    assert!(rules
        .vote_for(
            &revote,
            revote.proposed_header(),
            timestamp_for(revote.view()),
            &genesis_high_qc(),
        )
        .unwrap()
        .is_none());
}

#[test]
fn test_corrupt_record_is_not_genesis() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut rules = build_file_safety_rules(0, dir.path()).unwrap();
        let vertex = TestVertex::genesis_child(1);
        rules
            .vote_for(
                &vertex,
                vertex.proposed_header(),
                timestamp_for(vertex.view()),
                &genesis_high_qc(),
            )
            .unwrap();
    }

    let record = dir.path().join("safety_state.bin");
    let mut bytes = fs::read(&record).unwrap();
    bytes.truncate(bytes.len() / 2);
    fs::write(&record, bytes).unwrap();

    assert!(matches!(
        build_file_safety_rules(0, dir.path()),
        Err(SafetyError::Persistence(StorageError::Encoding { .. }))
    ));
}

#[test]
fn test_rules_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = SafetyConfigFile::from_toml(&format!(
        "seed = {:?}\nnode_id = 7\n\n[storage]\nkind = \"file\"\npath = {:?}\nfsync = false\n",
        [0u8; 32],
        dir.path().join("node-7"),
    ))
    .unwrap();

    let metrics = TestMetrics::default();
    let safety_metrics = Arc::new(SafetyMetricsValue::new(&metrics));

    let mut rules =
        bulwark::from_config::<BLSPubKey>(&config, Arc::clone(&safety_metrics)).unwrap();
    let vertex = TestVertex::genesis_child(1);
    let vote = rules
        .vote_for(
            &vertex,
            vertex.proposed_header(),
            timestamp_for(vertex.view()),
            &genesis_high_qc(),
        )
        .unwrap()
        .expect("first vote is safe");
    assert_eq!(vote.author(), &bulwark_testing::helpers::key_pair_for_id(7).1);
    drop(rules);

    let written = metrics.counter("safety_store_bytes_written");
    assert!(written > 0);
    assert_eq!(metrics.counter("safety_store_bytes_read"), 0);

    let reloaded = bulwark::from_config::<BLSPubKey>(&config, safety_metrics).unwrap();
    assert_eq!(reloaded.state().last_vote(), Some(&vote));
    assert_eq!(metrics.counter("safety_store_bytes_read"), written);
    assert_eq!(metrics.gauge("last_voted_view"), Some(1));
}
