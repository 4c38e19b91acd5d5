// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Provides the safety rules of a HotStuff-family BFT protocol
//!
//! A validator runs every vote, timeout and proposal through [`SafetyRules`], which refuses
//! anything that could contradict an earlier vote and persists its state before releasing a
//! signature.

/// Contains helper functions for the crate
pub mod helpers;

/// Contains the safety rules engine
pub mod safety_rules;

/// Contains traits consumed by [`SafetyRules`] and their implementations
pub mod traits;

/// Reexport error type
pub use bulwark_types::error::SafetyError;
use std::sync::Arc;

use bulwark_types::{
    consensus::SafetyMetricsValue,
    traits::{signer::KeyPairSigner, SignatureKey},
    validator_config::{SafetyConfigFile, ValidatorConfig},
};
pub use safety_rules::SafetyRules;
use tracing::info;
use traits::ConfiguredStorage;

/// Safety rules signing with a local key pair over the store selected in the config file
pub type ConfiguredSafetyRules<KEY> =
    SafetyRules<KEY, KeyPairSigner<KEY>, ConfiguredStorage<KEY>>;

/// Build the safety rules of the validator described by `config`, reloading its persisted state.
///
/// Both the rules and their store report to `metrics`.
///
/// # Errors
/// If the store cannot be opened or its record cannot be read
pub fn from_config<KEY: SignatureKey>(
    config: &SafetyConfigFile,
    metrics: Arc<SafetyMetricsValue>,
) -> Result<ConfiguredSafetyRules<KEY>, SafetyError> {
    let validator = ValidatorConfig::<KEY>::from(config);
    info!(
        "Starting safety rules for node {} with {:?} storage",
        config.node_id, config.storage
    );
    let storage = ConfiguredStorage::open(&config.storage, &metrics)?;
    Ok(SafetyRules::load(
        validator.public_key,
        storage,
        KeyPairSigner::new(validator.private_key),
    )?
    .with_metrics(metrics))
}
