//! LE Secure Connections OOB values and the confirmation-function seam.
//!
//! The confirmation value binds the OOB exchange to one pairing session:
//! `C = f4(PKx, PKx, r, 0)` in Bluetooth Core terms. Computing it is the
//! link layer's job; this crate only consumes it through [`OobConfirm`].

use std::fmt;

use zeroize::Zeroize;

use crate::PublicKeyBytes;

/// Length of the LESC OOB random value.
pub const OOB_RANDOM_LEN: usize = 16;
/// Length of the LESC OOB confirmation value.
pub const CONFIRM_VALUE_LEN: usize = 16;

/// The 16-byte OOB random nonce generated by the initiator.
#[derive(Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct OobRandom(pub [u8; OOB_RANDOM_LEN]);

impl OobRandom {
    /// Draw a fresh nonce from the OS RNG.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub fn as_bytes(&self) -> &[u8; OOB_RANDOM_LEN] {
        &self.0
    }
}

impl fmt::Debug for OobRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OobRandom({})", hex(&self.0))
    }
}

/// The 16-byte confirmation value derived from a pairing public key and an
/// [`OobRandom`].
#[derive(Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct ConfirmValue(pub [u8; CONFIRM_VALUE_LEN]);

impl ConfirmValue {
    pub fn as_bytes(&self) -> &[u8; CONFIRM_VALUE_LEN] {
        &self.0
    }
}

impl fmt::Debug for ConfirmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfirmValue({})", hex(&self.0))
    }
}

/// Peer OOB data handed back to the link layer when it asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct LescOobData {
    pub random: OobRandom,
    pub confirm: ConfirmValue,
}

impl LescOobData {
    /// OOB data that makes the link layer's confirm check fail.
    ///
    /// A zero random with an all-ones confirm only matches if
    /// `f4(PKx, PKx, 0, 0)` happens to be all ones.
    pub const fn invalid() -> Self {
        Self {
            random: OobRandom([0u8; OOB_RANDOM_LEN]),
            confirm: ConfirmValue([0xFF; CONFIRM_VALUE_LEN]),
        }
    }

    pub fn is_invalid_marker(&self) -> bool {
        *self == Self::invalid()
    }
}

/// Derives a confirmation value from a peer's LESC public key and a random.
///
/// Implemented by the link-layer adapter (typically the controller's or host
/// stack's f4 primitive). Closures of the matching shape also qualify.
pub trait OobConfirm {
    fn confirm(&self, peer_public_key: &PublicKeyBytes, random: &OobRandom) -> ConfirmValue;
}

impl<F> OobConfirm for F
where
    F: Fn(&PublicKeyBytes, &OobRandom) -> ConfirmValue,
{
    fn confirm(&self, peer_public_key: &PublicKeyBytes, random: &OobRandom) -> ConfirmValue {
        self(peer_public_key, random)
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
