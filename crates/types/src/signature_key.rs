// Copyright (c) 2021-2024 Espresso Systems (espressosys.com)
// This file is part of the Bulwark repository.

// You should have received a copy of the MIT License
// along with the Bulwark repository. If not, see <https://mit-license.org/>.

//! Types and structs for the validator signature keys

use jf_signature::{
    bls_over_bn254::{BLSOverBN254CurveSignatureScheme, KeyPair, SignKey, VerKey},
    SignatureError, SignatureScheme,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::instrument;

use crate::traits::signature_key::SignatureKey;

/// BLS private key used to sign a message
pub type BLSPrivKey = SignKey;
/// BLS public key used to verify a signature
pub type BLSPubKey = VerKey;
/// BLS signature over a single message
pub type BLSSignature = <BLSOverBN254CurveSignatureScheme as SignatureScheme>::Signature;

impl SignatureKey for BLSPubKey {
    type PrivateKey = BLSPrivKey;
    type Signature = BLSSignature;
    type SignError = SignatureError;

    #[instrument(skip(self))]
    fn validate(&self, signature: &Self::Signature, data: &[u8]) -> bool {
        BLSOverBN254CurveSignatureScheme::verify(&(), self, data, signature).is_ok()
    }

    fn sign(sk: &Self::PrivateKey, data: &[u8]) -> Result<Self::Signature, Self::SignError> {
        BLSOverBN254CurveSignatureScheme::sign(&(), sk, data, &mut rand::thread_rng())
    }

    fn from_private(private_key: &Self::PrivateKey) -> Self {
        BLSPubKey::from(private_key)
    }

    fn generated_from_seed_indexed(seed: [u8; 32], index: u64) -> (Self, Self::PrivateKey) {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&seed);
        hasher.update(&index.to_le_bytes());
        let new_seed = *hasher.finalize().as_bytes();
        let kp = KeyPair::generate(&mut ChaCha20Rng::from_seed(new_seed));
        (kp.ver_key(), kp.sign_key_ref().clone())
    }
}
