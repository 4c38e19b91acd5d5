// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

use std::path::Path;

use bulwark::{
    traits::{FileStorage, SafetyStateStore},
    SafetyError, SafetyRules,
};
use bulwark_example_types::{
    signer_types::TestSigner,
    storage_types::TestStorage,
    vertex_types::{genesis_high_qc, TestVertex},
};
use bulwark_types::{
    consensus::SafetyState,
    data::ViewNumber,
    logging::setup_logging,
    signature_key::BLSPubKey,
    traits::{signer::KeyPairSigner, SignatureKey, Vertex},
    vote::Vote,
};
use rand::Rng;

/// Safety rules over the fault-injecting test doubles
pub type TestSafetyRules =
    SafetyRules<BLSPubKey, TestSigner<BLSPubKey>, TestStorage<BLSPubKey>>;

/// Safety rules over a file store
pub type FileSafetyRules =
    SafetyRules<BLSPubKey, KeyPairSigner<BLSPubKey>, FileStorage<BLSPubKey>>;

/// A running engine together with handles on its store and signer
pub struct TestNode {
    /// the engine under test
    pub rules: TestSafetyRules,
    /// shares the engine's record and failure switch
    pub storage: TestStorage<BLSPubKey>,
    /// shares the engine's signature counter and failure switch
    pub signer: TestSigner<BLSPubKey>,
    /// node id the keys were derived from
    pub node_id: u64,
}

impl TestNode {
    /// Drop the engine and build a new one from what its store holds, as after a crash
    ///
    /// # Errors
    /// If the store cannot be read
    pub fn restart(self) -> Result<Self, SafetyError> {
        let Self {
            rules,
            storage,
            signer,
            node_id,
        } = self;
        drop(rules);
        tracing::info!("Node {node_id} restarting");
        let (_, public_key) = key_pair_for_id(node_id);
        let rules = SafetyRules::load(public_key, storage.clone(), signer.clone())?;
        Ok(Self {
            rules,
            storage,
            signer,
            node_id,
        })
    }

    /// Vote for `vertex` with its own proposed header, as a validator that has only seen genesis
    ///
    /// # Errors
    /// If the engine fails to vote
    pub fn vote(&mut self, vertex: &TestVertex) -> Result<Option<Vote<BLSPubKey>>, SafetyError> {
        self.rules.vote_for(
            vertex,
            vertex.proposed_header(),
            timestamp_for(vertex.view()),
            &genesis_high_qc(),
        )
    }
}

/// get the keypair for a node id
#[must_use]
pub fn key_pair_for_id(node_id: u64) -> (<BLSPubKey as SignatureKey>::PrivateKey, BLSPubKey) {
    let private_key =
        <BLSPubKey as SignatureKey>::generated_from_seed_indexed([0u8; 32], node_id).1;
    let public_key = <BLSPubKey as SignatureKey>::from_private(&private_key);
    (private_key, public_key)
}

/// A deterministic vote timestamp for `view`
#[must_use]
pub fn timestamp_for(view: ViewNumber) -> u64 {
    1_700_000_000_000 + *view * 1_000
}

/// Build a fresh node that never voted
#[must_use]
pub fn build_test_node(node_id: u64) -> TestNode {
    build_test_node_with_state(node_id, SafetyState::initial())
}

/// Build a node whose store already holds `last_voted_view` and `locked_view`
///
/// # Panics
/// If the state cannot be stored, which the test store never refuses unless told to
#[must_use]
pub fn build_test_node_with_views(node_id: u64, last_voted_view: u64, locked_view: u64) -> TestNode {
    build_test_node_with_state(
        node_id,
        SafetyState::new(
            ViewNumber::new(last_voted_view),
            ViewNumber::new(locked_view),
            None,
        ),
    )
}

/// Build a node whose store already holds `state`
///
/// # Panics
/// If the state cannot be stored, which the test store never refuses unless told to
#[must_use]
pub fn build_test_node_with_state(node_id: u64, state: SafetyState<BLSPubKey>) -> TestNode {
    setup_logging();
    let (private_key, public_key) = key_pair_for_id(node_id);
    let mut storage = TestStorage::default();
    if state != SafetyState::initial() {
        storage.store(&state).unwrap();
    }
    let signer = TestSigner::new(private_key);
    let rules = SafetyRules::new(public_key, state, storage.clone(), signer.clone());
    TestNode {
        rules,
        storage,
        signer,
        node_id,
    }
}

/// Open safety rules over a file store in `dir`, reloading whatever it holds
///
/// # Errors
/// If the store cannot be opened or read
pub fn build_file_safety_rules(
    node_id: u64,
    dir: impl AsRef<Path>,
) -> Result<FileSafetyRules, SafetyError> {
    setup_logging();
    let (private_key, public_key) = key_pair_for_id(node_id);
    let storage = FileStorage::open(dir, true)?;
    SafetyRules::load(public_key, storage, KeyPairSigner::new(private_key))
}

/// A random well-formed vertex with a view in `1..=max_view`
pub fn random_vertex<R: Rng>(rng: &mut R, max_view: u64) -> TestVertex {
    let view = rng.gen_range(1..=max_view);
    let parent_view = rng.gen_range(0..view);
    let grandparent_view = rng.gen_range(0..=parent_view);
    TestVertex::chain(view, parent_view, grandparent_view)
}
