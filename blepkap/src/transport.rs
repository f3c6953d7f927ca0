//! Transport adapter seam and the pairing parameters exchanged with it.
//!
//! The transport owns the GATT auth characteristic and the link layer's
//! pairing procedure. It forwards pairing events to
//! [`PkapResponder`](crate::PkapResponder) and implements
//! [`PairingTransport`] so the core can publish the responder token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ConnectionId, PublicKeyBytes};

/// 128-bit UUID of the BLE-PKAP GATT service.
pub const PKAP_SERVICE_UUID: &str = "e278ee00-bc2c-e6c0-583c-1c5f15336b24";
/// 128-bit UUID of the auth token characteristic.
pub const PKAP_AUTH_CHAR_UUID: &str = "e278ee01-bc2c-e6c0-583c-1c5f15336b24";

/// Outbound operations the core needs from the transport.
pub trait PairingTransport {
    /// The local device's LESC pairing public key (X‖Y).
    fn local_pairing_key(&self) -> PublicKeyBytes;

    /// Set the auth characteristic value readable by `conn`.
    fn publish_token(&mut self, conn: ConnectionId, token: &[u8]);

    /// Empty the auth characteristic value for `conn`.
    fn clear_token(&mut self, conn: ConnectionId);
}

/// LE security mode 1 levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SecurityLevel {
    /// Level 1: no encryption.
    NoSecurity = 1,
    /// Level 2: unauthenticated encryption ("just works").
    Unauthenticated = 2,
    /// Level 3: authenticated pairing with encryption.
    Authenticated = 3,
    /// Level 4: authenticated LE Secure Connections with a 128-bit key.
    LescAuthenticated = 4,
}

impl SecurityLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode 1 level {}", self.as_u8())
    }
}

/// The peer's pairing request, as far as the core cares about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairingRequest {
    /// Peer requested LE Secure Connections.
    pub lesc: bool,
    /// Peer has OOB data for us.
    pub oob: bool,
}

impl PairingRequest {
    /// LESC pairing with OOB data, the only variant BLE-PKAP accepts.
    pub const fn lesc_oob() -> Self {
        Self {
            lesc: true,
            oob: true,
        }
    }

    pub fn is_lesc_oob(&self) -> bool {
        self.lesc && self.oob
    }
}

/// Local security parameters returned when a pairing request is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingAccept {
    pub lesc: bool,
    pub oob: bool,
    pub bond: bool,
    pub mitm: bool,
    pub min_key_size: u8,
    pub max_key_size: u8,
    /// Our LESC pairing public key, for the key exchange.
    pub local_pairing_key: PublicKeyBytes,
}
