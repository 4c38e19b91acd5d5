// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! In-memory implementation of the safety state store
//!
//! This module provides a non-persisting adapter for the [`SafetyStateStore`] trait. Clones share
//! the same record, so a clone handed to a new engine behaves like a restart on top of the same
//! storage.

use std::sync::{Arc, RwLock};

use bulwark_types::{
    consensus::SafetyState,
    traits::{
        storage::{Result, SafetyStateStore, StorageError},
        SignatureKey,
    },
};

/// Internal state for a [`MemoryStorage`]
#[derive(Debug)]
struct MemoryStorageInternal<KEY: SignatureKey> {
    /// The stored record
    state: Option<SafetyState<KEY>>,
    /// Number of successful stores
    writes: usize,
}

/// In memory, ephemeral, storage for a validator's safety state
#[derive(Clone, Debug)]
pub struct MemoryStorage<KEY: SignatureKey> {
    /// The inner state of this [`MemoryStorage`]
    inner: Arc<RwLock<MemoryStorageInternal<KEY>>>,
    /// Whether this handle was closed
    closed: bool,
}

impl<KEY: SignatureKey> MemoryStorage<KEY> {
    /// Create a store holding no record
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryStorageInternal {
                state: None,
                writes: 0,
            })),
            closed: false,
        }
    }

    /// Create a store already holding `state`
    #[must_use]
    pub fn with_state(state: SafetyState<KEY>) -> Self {
        let storage = Self::empty();
        if let Ok(mut inner) = storage.inner.write() {
            inner.state = Some(state);
        }
        storage
    }

    /// The stored record
    #[must_use]
    pub fn stored(&self) -> Option<SafetyState<KEY>> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.state.clone())
    }

    /// Number of successful stores through any handle
    #[must_use]
    pub fn writes(&self) -> usize {
        self.inner.read().map_or(0, |inner| inner.writes)
    }

    /// Fail if this handle was closed
    fn ensure_open(&self) -> Result {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl<KEY: SignatureKey> Default for MemoryStorage<KEY> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A poisoned lock means a writer panicked mid-update
fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable {
        reason: "memory storage lock poisoned".to_string(),
    }
}

impl<KEY: SignatureKey> SafetyStateStore<KEY> for MemoryStorage<KEY> {
    fn load(&self) -> Result<Option<SafetyState<KEY>>> {
        self.ensure_open()?;
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.state.clone())
    }

    fn store(&mut self, state: &SafetyState<KEY>) -> Result {
        self.ensure_open()?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.state = Some(state.clone());
        inner.writes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result {
        self.closed = true;
        Ok(())
    }
}
