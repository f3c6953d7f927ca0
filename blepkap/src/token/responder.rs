// Responder auth token: published by the responder once the initiator is
// authenticated, read back by the initiator after pairing.

use crate::crypto::keys::{verify_signature, IdentityKeyPair, PRIVATE_KEY_LEN, SIGNATURE_LEN};
use crate::error::{DecodeError, PkapError, Result};
use crate::oob::ConfirmValue;
use crate::token::{decode_header, encode_header, signed_digest, FORMAT_V1, HEADER_LEN};
use crate::{KeyId, PublicKeyBytes};

/// Decoded responder token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderAuthToken {
    pub format: u8,
    pub key_id: KeyId,
    pub signature: [u8; SIGNATURE_LEN],
}

impl ResponderAuthToken {
    /// Encoded size: header + signature.
    pub const LEN: usize = HEADER_LEN + SIGNATURE_LEN;

    /// Decode a 67-byte responder token.
    pub fn decode(buf: &[u8]) -> std::result::Result<Self, DecodeError> {
        let key_id = decode_header(buf, Self::LEN)?;
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.copy_from_slice(&buf[HEADER_LEN..Self::LEN]);
        Ok(Self {
            format: FORMAT_V1,
            key_id,
            signature,
        })
    }

    /// Sign SHA-256(`confirm`) with `identity` and build the token.
    pub fn generate(key_id: KeyId, confirm: &ConfirmValue, identity: &IdentityKeyPair) -> Result<Self> {
        let signature = identity.sign_digest(&signed_digest(confirm))?;
        Ok(Self {
            format: FORMAT_V1,
            key_id,
            signature,
        })
    }

    /// Generate a token from a raw private key straight into `out`.
    pub fn generate_into(
        key_id: KeyId,
        confirm: &ConfirmValue,
        private_key: &[u8; PRIVATE_KEY_LEN],
        out: &mut [u8],
    ) -> Result<usize> {
        check_capacity(out)?;
        let identity = IdentityKeyPair::from_private_key(private_key)?;
        Self::generate(key_id, confirm, &identity)?.encode_into(out)
    }

    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize> {
        check_capacity(out)?;
        encode_header(out, self.key_id);
        out[HEADER_LEN..Self::LEN].copy_from_slice(&self.signature);
        Ok(Self::LEN)
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        encode_header(&mut out, self.key_id);
        out[HEADER_LEN..].copy_from_slice(&self.signature);
        out
    }

    pub fn check_signature(&self, confirm: &ConfirmValue, public_key: &PublicKeyBytes) -> Result<()> {
        if self.format != FORMAT_V1 {
            return Err(DecodeError::UnsupportedVersion(self.format).into());
        }
        verify_signature(public_key, &signed_digest(confirm), &self.signature)
    }

    pub fn verify(&self, confirm: &ConfirmValue, public_key: &PublicKeyBytes) -> bool {
        self.check_signature(confirm, public_key).is_ok()
    }
}

fn check_capacity(out: &[u8]) -> Result<()> {
    if out.len() < ResponderAuthToken::LEN {
        return Err(PkapError::BufferTooSmall {
            need: ResponderAuthToken::LEN,
            have: out.len(),
        });
    }
    Ok(())
}
