// ECDSA-P256 identity keys, raw X‖Y public key handling, prehash sign/verify

use std::fmt;

use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::EncodedPoint;
use zeroize::Zeroize;

use crate::error::{PkapError, Result};
use crate::PublicKeyBytes;

/// Length of a raw P-256 private scalar.
pub const PRIVATE_KEY_LEN: usize = 32;
/// Length of a raw uncompressed P-256 public key without the SEC1 tag.
pub const PUBLIC_KEY_LEN: usize = 64;
/// Length of an r‖s ECDSA-P256 signature.
pub const SIGNATURE_LEN: usize = 64;

/// A long-term ECDSA-P256 identity keypair.
///
/// The signing key is wiped by `p256` when dropped.
pub struct IdentityKeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl IdentityKeyPair {
    /// Generate a fresh random P-256 keypair.
    pub fn generate() -> Self {
        // `SigningKey::random` needs a rand_core 0.6 RNG, which rand 0.10 no
        // longer implements, so scalars are sampled and range-checked here.
        loop {
            let mut candidate: [u8; PRIVATE_KEY_LEN] = rand::random();
            let parsed = SigningKey::from_slice(&candidate);
            candidate.zeroize();
            // Zero or >= n is rejected; retry with fresh bytes.
            if let Ok(signing_key) = parsed {
                return Self::from_signing_key(signing_key);
            }
        }
    }

    /// Reconstruct from a raw 32-byte big-endian private scalar.
    pub fn from_private_key(private_key: &[u8; PRIVATE_KEY_LEN]) -> Result<Self> {
        let signing_key = SigningKey::from_slice(private_key)
            .map_err(|e| PkapError::InvalidKey(format!("private key: {e}")))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = VerifyingKey::from(&signing_key);
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// The 64-byte raw public key (X‖Y).
    pub fn public_key_bytes(&self) -> PublicKeyBytes {
        let point = self.verifying_key.to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_LEN];
        // Skip the 0x04 SEC1 tag.
        out.copy_from_slice(&point.as_bytes()[1..]);
        out
    }

    /// The 32-byte private scalar. Callers own wiping the copy.
    pub fn private_key_bytes(&self) -> [u8; PRIVATE_KEY_LEN] {
        let mut out = [0u8; PRIVATE_KEY_LEN];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// Access the raw verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Sign a precomputed 32-byte digest, returning the r‖s signature.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]> {
        let sig: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| PkapError::Signing(format!("{e}")))?;
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }

    /// Verify a signature over `digest` against this keypair's public key.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &[u8; SIGNATURE_LEN]) -> Result<()> {
        let sig = Signature::from_slice(signature).map_err(|_| PkapError::SignatureInvalid)?;
        self.verifying_key
            .verify_prehash(digest, &sig)
            .map_err(|_| PkapError::SignatureInvalid)
    }
}

impl fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("public_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

/// Parse a raw 64-byte X‖Y public key into a verifying key.
pub fn verifying_key_from_raw(public_key: &PublicKeyBytes) -> Result<VerifyingKey> {
    let point = EncodedPoint::from_untagged_bytes(public_key.into());
    VerifyingKey::from_encoded_point(&point)
        .map_err(|e| PkapError::InvalidKey(format!("public key: {e}")))
}

/// Verify an r‖s signature over a 32-byte digest given raw public key bytes.
pub fn verify_signature(
    public_key: &PublicKeyBytes,
    digest: &[u8; 32],
    signature: &[u8; SIGNATURE_LEN],
) -> Result<()> {
    let vk = verifying_key_from_raw(public_key)?;
    // r or s of zero, or >= n, fails here rather than in verify.
    let sig = Signature::from_slice(signature).map_err(|_| PkapError::SignatureInvalid)?;
    vk.verify_prehash(digest, &sig)
        .map_err(|_| PkapError::SignatureInvalid)
}
