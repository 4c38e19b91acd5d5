// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use anyhow::{bail, Result};
use bulwark_types::traits::{signer::KeyPairSigner, HashSigner, SignatureKey};

/// A key pair signer that counts its signatures and can be made to fail.
///
/// Clones share the counter and the failure switch.
#[derive(Clone, Debug)]
pub struct TestSigner<KEY: SignatureKey> {
    /// signs when not failing
    signer: KeyPairSigner<KEY>,
    /// number of signatures produced
    signatures: Arc<AtomicUsize>,
    /// `should_return_err` is a testing utility to validate negative cases.
    should_return_err: Arc<AtomicBool>,
}

impl<KEY: SignatureKey> TestSigner<KEY> {
    /// Create a signer over `private_key`
    #[must_use]
    pub fn new(private_key: KEY::PrivateKey) -> Self {
        Self {
            signer: KeyPairSigner::new(private_key),
            signatures: Arc::new(AtomicUsize::new(0)),
            should_return_err: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every following signature fail, or succeed again
    pub fn set_should_return_err(&self, should_return_err: bool) {
        self.should_return_err
            .store(should_return_err, Ordering::SeqCst);
    }

    /// Number of signatures produced so far
    #[must_use]
    pub fn signatures(&self) -> usize {
        self.signatures.load(Ordering::SeqCst)
    }
}

impl<KEY: SignatureKey> HashSigner<KEY> for TestSigner<KEY> {
    fn sign(&self, hash: &[u8]) -> Result<KEY::Signature> {
        if self.should_return_err.load(Ordering::SeqCst) {
            bail!("Signing key unavailable");
        }
        let signature = self.signer.sign(hash)?;
        self.signatures.fetch_add(1, Ordering::SeqCst);
        Ok(signature)
    }
}
