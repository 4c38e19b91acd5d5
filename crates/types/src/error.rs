// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Error type for `Bulwark`
//!
//! This module provides [`SafetyError`], which is an enum representing possible faults that can
//! occur while interacting with the safety rules. A refusal to vote is not an error; every
//! variant here means the validator must stop participating until an operator intervenes.

use thiserror::Error;

use crate::{data::ViewNumber, traits::storage::StorageError};

/// Error type for `Bulwark`
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SafetyError {
    /// The new safety state could not be made durable, so nothing derived from it was released
    #[error("Failed to persist safety state: {0}")]
    Persistence(#[from] StorageError),

    /// A vote, timeout or proposal could not be signed
    #[error("Failed to sign {what} for view {view}: {reason}")]
    Signing {
        /// What was being signed
        what: &'static str,
        /// View of the signed object
        view: ViewNumber,
        /// The signer's error
        reason: String,
    },

    /// The vertex store handed over a vertex whose headers contradict its own view
    #[error("Malformed vertex at view {view}: {reason}")]
    MalformedVertex {
        /// View of the vertex
        view: ViewNumber,
        /// The inconsistency found
        reason: String,
    },

    /// The committed certificate is for a later view than the highest certificate
    #[error("Invalid HighQC: committed view {committed_view} above highest view {highest_view}")]
    InvalidHighQc {
        /// View of the highest certificate
        highest_view: ViewNumber,
        /// View of the committed certificate
        committed_view: ViewNumber,
    },
}
