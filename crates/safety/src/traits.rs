// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Safety state store implementations
mod storage;

pub use bulwark_types::traits::{HashSigner, SafetyStateStore, SignatureKey, Vertex};
pub use storage::{ConfiguredStorage, FileStorage, MemoryStorage};
