// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Implementations of [`SafetyStateStore`]

mod file_storage;
mod memory_storage;

use std::sync::Arc;

use bulwark_types::{
    consensus::{SafetyMetricsValue, SafetyState},
    traits::{storage::Result, SafetyStateStore, SignatureKey},
    validator_config::StorageConfig,
};
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// The store selected by a [`StorageConfig`]
#[derive(Debug)]
pub enum ConfiguredStorage<KEY: SignatureKey> {
    /// In-memory store
    Memory(MemoryStorage<KEY>),
    /// File-backed store
    File(FileStorage<KEY>),
}

impl<KEY: SignatureKey> ConfiguredStorage<KEY> {
    /// Open the store described by `config`, reporting file activity to `metrics`
    ///
    /// # Errors
    /// If a file store's directory cannot be created
    pub fn open(config: &StorageConfig, metrics: &Arc<SafetyMetricsValue>) -> Result<Self> {
        Ok(match config {
            StorageConfig::Memory => Self::Memory(MemoryStorage::empty()),
            StorageConfig::File { path, fsync } => Self::File(
                FileStorage::open(path, *fsync)?.with_metrics(Arc::clone(metrics)),
            ),
        })
    }
}

impl<KEY: SignatureKey> SafetyStateStore<KEY> for ConfiguredStorage<KEY> {
    fn load(&self) -> Result<Option<SafetyState<KEY>>> {
        match self {
            Self::Memory(storage) => storage.load(),
            Self::File(storage) => storage.load(),
        }
    }

    fn store(&mut self, state: &SafetyState<KEY>) -> Result {
        match self {
            Self::Memory(storage) => storage.store(state),
            Self::File(storage) => storage.store(state),
        }
    }

    fn close(&mut self) -> Result {
        match self {
            Self::Memory(storage) => storage.close(),
            Self::File(storage) => storage.close(),
        }
    }
}
