// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! The signing capability handed to the safety rules
//!
//! This module provides the [`HashSigner`] trait and [`KeyPairSigner`], its implementation over
//! any [`SignatureKey`] key pair.

use anyhow::{Context, Result};

use super::signature_key::SignatureKey;

/// Signs hashes on behalf of a single validator.
pub trait HashSigner<KEY: SignatureKey>: Send + Sync {
    /// Sign `hash`
    /// # Errors
    /// If the signature could not be produced. The safety rules treat this as fatal.
    fn sign(&self, hash: &[u8]) -> Result<KEY::Signature>;
}

/// A [`HashSigner`] holding the validator's private key in memory.
#[derive(Clone, custom_debug::Debug)]
pub struct KeyPairSigner<KEY: SignatureKey> {
    /// Public half of the key pair
    public_key: KEY,
    /// Private half of the key pair
    #[debug(skip)]
    private_key: KEY::PrivateKey,
}

impl<KEY: SignatureKey> KeyPairSigner<KEY> {
    /// Create a signer from a private key
    #[must_use]
    pub fn new(private_key: KEY::PrivateKey) -> Self {
        Self {
            public_key: KEY::from_private(&private_key),
            private_key,
        }
    }

    /// The key signatures can be verified with
    #[must_use]
    pub fn public_key(&self) -> &KEY {
        &self.public_key
    }
}

impl<KEY: SignatureKey> HashSigner<KEY> for KeyPairSigner<KEY> {
    fn sign(&self, hash: &[u8]) -> Result<KEY::Signature> {
        KEY::sign(&self.private_key, hash).context("Failed to sign hash with validator key")
    }
}
