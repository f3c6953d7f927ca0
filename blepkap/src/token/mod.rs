// BLE-PKAP auth tokens.
//
// Wire format (big-endian, fixed size, no padding):
// [format:1B][key_id:2B][signature:64B]                 responder, 67 bytes
// [format:1B][key_id:2B][signature:64B][random:16B]     initiator, 83 bytes
//
// The signature is ECDSA-P256 (r‖s) over SHA-256(confirmation value).

pub mod initiator;
pub mod responder;

pub use initiator::InitiatorAuthToken;
pub use responder::ResponderAuthToken;

use crate::crypto::hash::hash_sha256;
use crate::error::DecodeError;
use crate::oob::ConfirmValue;
use crate::KeyId;

/// The only token format defined so far.
pub const FORMAT_V1: u8 = 1;
/// format + key id.
pub const HEADER_LEN: usize = 3;

/// Validate a token frame and return its key id.
///
/// A format byte is required before the length is judged, so an empty
/// buffer reports `WrongLength` and a wrong format wins over a wrong length.
pub(crate) fn decode_header(buf: &[u8], expected: usize) -> Result<KeyId, DecodeError> {
    let format = *buf.first().ok_or(DecodeError::WrongLength {
        expected,
        actual: 0,
    })?;
    if format != FORMAT_V1 {
        return Err(DecodeError::UnsupportedVersion(format));
    }
    if buf.len() != expected {
        return Err(DecodeError::WrongLength {
            expected,
            actual: buf.len(),
        });
    }
    Ok(u16::from_be_bytes([buf[1], buf[2]]))
}

pub(crate) fn encode_header(out: &mut [u8], key_id: KeyId) {
    out[0] = FORMAT_V1;
    out[1..HEADER_LEN].copy_from_slice(&key_id.to_be_bytes());
}

/// The digest both token kinds sign.
pub(crate) fn signed_digest(confirm: &ConfirmValue) -> [u8; 32] {
    hash_sha256(confirm.as_bytes())
}
