// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, RwLock,
};

use bulwark_types::{
    consensus::SafetyState,
    traits::{
        storage::{Result, SafetyStateStore, StorageError},
        SignatureKey,
    },
};
use tracing::debug;

/// Shared state behind every handle of a [`TestStorage`]
#[derive(Debug)]
struct TestStorageState<KEY: SignatureKey> {
    /// The stored record
    state: RwLock<Option<SafetyState<KEY>>>,
    /// Number of successful stores
    stores: AtomicUsize,
    /// `should_return_err` is a testing utility to validate negative cases.
    should_return_err: AtomicBool,
}

/// A store whose failures can be switched on and off while an engine owns it.
///
/// Clones share the record and the failure switch, so a test keeps one handle and hands a clone
/// to the safety rules.
#[derive(Clone, Debug)]
pub struct TestStorage<KEY: SignatureKey> {
    /// shared state
    inner: Arc<TestStorageState<KEY>>,
}

impl<KEY: SignatureKey> Default for TestStorage<KEY> {
    fn default() -> Self {
        Self {
            inner: Arc::new(TestStorageState {
                state: RwLock::new(None),
                stores: AtomicUsize::new(0),
                should_return_err: AtomicBool::new(false),
            }),
        }
    }
}

impl<KEY: SignatureKey> TestStorage<KEY> {
    /// Make every following call fail, or succeed again
    pub fn set_should_return_err(&self, should_return_err: bool) {
        self.inner
            .should_return_err
            .store(should_return_err, Ordering::SeqCst);
    }

    /// The stored record
    #[must_use]
    pub fn stored(&self) -> Option<SafetyState<KEY>> {
        self.inner
            .state
            .read()
            .ok()
            .and_then(|state| state.clone())
    }

    /// Number of successful stores
    #[must_use]
    pub fn stores(&self) -> usize {
        self.inner.stores.load(Ordering::SeqCst)
    }

    /// Fail if failures are switched on
    fn check_failure(&self, operation: &str) -> Result {
        if self.inner.should_return_err.load(Ordering::SeqCst) {
            debug!("Injecting failure into {operation}");
            return Err(StorageError::Unavailable {
                reason: format!("injected failure on {operation}"),
            });
        }
        Ok(())
    }
}

impl<KEY: SignatureKey> SafetyStateStore<KEY> for TestStorage<KEY> {
    fn load(&self) -> Result<Option<SafetyState<KEY>>> {
        self.check_failure("load")?;
        Ok(self.stored())
    }

    fn store(&mut self, state: &SafetyState<KEY>) -> Result {
        self.check_failure("store")?;
        let mut stored = self
            .inner
            .state
            .write()
            .map_err(|_| StorageError::Unavailable {
                reason: "test storage lock poisoned".to_string(),
            })?;
        *stored = Some(state.clone());
        self.inner.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> Result {
        self.check_failure("close")
    }
}
