// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Configuration of a validator's safety rules

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::traits::signature_key::SignatureKey;

/// Errors reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file is not valid TOML for the expected layout
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where the safety state is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Keep the state in memory only. Useful for tests; a restart loses the safety record.
    #[default]
    Memory,
    /// Persist to a directory on disk
    File {
        /// Directory holding the safety record
        path: PathBuf,
        /// Whether to fsync each write before reporting it durable
        #[serde(default = "default_fsync")]
        fsync: bool,
    },
}

/// `fsync` defaults to on
fn default_fsync() -> bool {
    true
}

/// Holds configuration for a validator's safety rules
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SafetyConfigFile {
    /// The validator's seed
    pub seed: [u8; 32],
    /// The validator's index, which can be treated as another input to the seed
    pub node_id: u64,
    /// Safety state persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

impl SafetyConfigFile {
    /// Read the config from a TOML file
    /// # Errors
    /// If the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| {
            error!("Failed to read safety config {}: {source}", path.display());
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml(&contents)
    }

    /// Parse the config from TOML text
    /// # Errors
    /// If the text is not a valid config
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Key material of a validator
#[derive(Clone, custom_debug::Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct ValidatorConfig<KEY: SignatureKey> {
    /// The validator's public key
    pub public_key: KEY,
    /// The validator's private key
    #[debug(skip)]
    pub private_key: KEY::PrivateKey,
}

impl<KEY: SignatureKey> ValidatorConfig<KEY> {
    /// generate validator config from input seed and index
    #[must_use]
    pub fn generated_from_seed_indexed(seed: [u8; 32], index: u64) -> Self {
        let (public_key, private_key) = KEY::generated_from_seed_indexed(seed, index);
        Self {
            public_key,
            private_key,
        }
    }
}

impl<KEY: SignatureKey> From<&SafetyConfigFile> for ValidatorConfig<KEY> {
    fn from(val: &SafetyConfigFile) -> Self {
        Self::generated_from_seed_indexed(val.seed, val.node_id)
    }
}
