// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Abstraction over durable storage of the safety state
//!
//! This modules provides the [`SafetyStateStore`] trait.

use std::path::PathBuf;

use snafu::Snafu;

use super::signature_key::SignatureKey;
use crate::consensus::SafetyState;

/// Errors that can occur in the storage layer.
#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        /// File the operation was on
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// A record could not be encoded or decoded
    #[snafu(display("Failed to encode or decode safety state: {source}"))]
    Encoding {
        /// Underlying error
        source: bincode::Error,
    },
    /// The store was used after being closed
    #[snafu(display("Safety state store is closed"))]
    Closed,
    /// The backend refused the operation
    #[snafu(display("Safety state store unavailable: {reason}"))]
    Unavailable {
        /// Why the backend refused
        reason: String,
    },
}

/// Result for a storage type
pub type Result<T = ()> = std::result::Result<T, StorageError>;

/// Durable single-record store for the [`SafetyState`] of one validator.
///
/// All calls come from the single consensus thread and block until they complete. A successful
/// [`store`](SafetyStateStore::store) means the state survives a crash of the process.
pub trait SafetyStateStore<KEY: SignatureKey>: Send {
    /// Load the last stored state, if any state was ever stored
    /// # Errors
    /// If the record exists but cannot be read. A record that cannot be read is never reported
    /// as absent.
    fn load(&self) -> Result<Option<SafetyState<KEY>>>;

    /// Durably replace the stored state with `state`
    /// # Errors
    /// If the state could not be made durable
    fn store(&mut self, state: &SafetyState<KEY>) -> Result;

    /// Release the backing resources. Later calls fail with [`StorageError::Closed`].
    /// # Errors
    /// If flushing the backend fails
    fn close(&mut self) -> Result;
}
