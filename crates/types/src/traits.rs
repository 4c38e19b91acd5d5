// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Common traits for the `Bulwark` safety rules
pub mod metrics;
pub mod signature_key;
pub mod signer;
pub mod storage;
pub mod vertex;

pub use signature_key::SignatureKey;
pub use signer::HashSigner;
pub use storage::SafetyStateStore;
pub use vertex::Vertex;
