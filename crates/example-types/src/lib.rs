// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Test doubles for the capabilities the safety rules consume

/// vertex types
pub mod vertex_types;

/// storage types with fault injection
pub mod storage_types;

/// signers with fault injection
pub mod signer_types;

/// metrics recording every value
pub mod metrics_types;
