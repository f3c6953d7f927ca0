// Initiator auth token: written by the initiator before pairing starts.

use crate::crypto::keys::{verify_signature, IdentityKeyPair, PRIVATE_KEY_LEN, SIGNATURE_LEN};
use crate::error::{DecodeError, PkapError, Result};
use crate::oob::{ConfirmValue, OobRandom, OOB_RANDOM_LEN};
use crate::token::{decode_header, encode_header, signed_digest, FORMAT_V1, HEADER_LEN};
use crate::{KeyId, PublicKeyBytes};

const SIG_OFFSET: usize = HEADER_LEN;
const RANDOM_OFFSET: usize = SIG_OFFSET + SIGNATURE_LEN;

/// Decoded initiator token. All fields are owned copies of the wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatorAuthToken {
    pub format: u8,
    pub key_id: KeyId,
    pub signature: [u8; SIGNATURE_LEN],
    pub random: OobRandom,
}

impl InitiatorAuthToken {
    /// Encoded size: header + signature + random.
    pub const LEN: usize = HEADER_LEN + SIGNATURE_LEN + OOB_RANDOM_LEN;

    /// Decode an 83-byte initiator token.
    pub fn decode(buf: &[u8]) -> std::result::Result<Self, DecodeError> {
        let key_id = decode_header(buf, Self::LEN)?;
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&buf[SIG_OFFSET..RANDOM_OFFSET]);
        let mut random = [0u8; OOB_RANDOM_LEN];
        random.copy_from_slice(&buf[RANDOM_OFFSET..Self::LEN]);
        Ok(Self {
            format: FORMAT_V1,
            key_id,
            signature,
            random: OobRandom(random),
        })
    }

    /// Sign SHA-256(`confirm`) with `identity` and build the token.
    pub fn generate(
        key_id: KeyId,
        confirm: &ConfirmValue,
        random: &OobRandom,
        identity: &IdentityKeyPair,
    ) -> Result<Self> {
        let signature = identity.sign_digest(&signed_digest(confirm))?;
        Ok(Self {
            format: FORMAT_V1,
            key_id,
            signature,
            random: *random,
        })
    }

    /// Generate a token from a raw private key straight into `out`.
    ///
    /// Returns the number of bytes written.
    pub fn generate_into(
        key_id: KeyId,
        confirm: &ConfirmValue,
        random: &OobRandom,
        private_key: &[u8; PRIVATE_KEY_LEN],
        out: &mut [u8],
    ) -> Result<usize> {
        check_capacity(out)?;
        let identity = IdentityKeyPair::from_private_key(private_key)?;
        Self::generate(key_id, confirm, random, &identity)?.encode_into(out)
    }

    /// Serialize into `out`, returning the number of bytes written.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize> {
        check_capacity(out)?;
        encode_header(out, self.key_id);
        out[SIG_OFFSET..RANDOM_OFFSET].copy_from_slice(&self.signature);
        out[RANDOM_OFFSET..Self::LEN].copy_from_slice(self.random.as_bytes());
        Ok(Self::LEN)
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        encode_header(&mut out, self.key_id);
        out[SIG_OFFSET..RANDOM_OFFSET].copy_from_slice(&self.signature);
        out[RANDOM_OFFSET..].copy_from_slice(self.random.as_bytes());
        out
    }

    /// Check the signature over SHA-256(`confirm`) against `public_key`.
    pub fn check_signature(&self, confirm: &ConfirmValue, public_key: &PublicKeyBytes) -> Result<()> {
        if self.format != FORMAT_V1 {
            return Err(DecodeError::UnsupportedVersion(self.format).into());
        }
        verify_signature(public_key, &signed_digest(confirm), &self.signature)
    }

    /// `true` if the signature verifies.
    pub fn verify(&self, confirm: &ConfirmValue, public_key: &PublicKeyBytes) -> bool {
        self.check_signature(confirm, public_key).is_ok()
    }
}

fn check_capacity(out: &[u8]) -> Result<()> {
    if out.len() < InitiatorAuthToken::LEN {
        return Err(PkapError::BufferTooSmall {
            need: InitiatorAuthToken::LEN,
            have: out.len(),
        });
    }
    Ok(())
}
