// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Encoding of persisted records

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

/// For the persisted format, we use bincode with the following options:
///   - No upper size limit
///   - Little endian encoding
///   - Fixint encoding
///   - Reject trailing bytes
#[must_use]
pub fn bincode_opts() -> impl Options + Copy {
    bincode::DefaultOptions::new()
        .with_no_limit()
        .with_little_endian()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode `value` in the persisted format
///
/// # Errors
/// If `value` cannot be serialized
pub fn encode_record<T: Serialize>(value: &T) -> bincode::Result<Vec<u8>> {
    bincode_opts().serialize(value)
}

/// Decode a value from the persisted format. Trailing bytes are an error.
///
/// # Errors
/// If `bytes` is not exactly one encoded `T`
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> bincode::Result<T> {
    bincode_opts().deserialize(bytes)
}
