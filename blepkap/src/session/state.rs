// Authentication session state.

use std::fmt;

use zeroize::Zeroize;

use crate::token::InitiatorAuthToken;
use crate::{ConnectionId, PublicKeyBytes};

/// Progress of one connection through the BLE-PKAP handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthState {
    /// No authentication in progress.
    Idle,
    /// A valid initiator token from a known key id is stored.
    TokenReceived,
    /// LESC OOB pairing was accepted.
    OobPairingStarted,
    /// The peer's LESC pairing public key has arrived.
    PeerKeyReceived,
    /// The initiator's signature verified; our token is published.
    PeerAuthenticated,
    /// Pairing finished at the required security level.
    Complete,
}

impl AuthState {
    /// Human-readable label for the current state (used in errors and logs).
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Idle => "Idle",
            AuthState::TokenReceived => "TokenReceived",
            AuthState::OobPairingStarted => "OobPairingStarted",
            AuthState::PeerKeyReceived => "PeerKeyReceived",
            AuthState::PeerAuthenticated => "PeerAuthenticated",
            AuthState::Complete => "Complete",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutable state owned by the protocol for one connection.
///
/// Every field is wiped when the session is dropped.
pub struct AuthSession {
    conn: ConnectionId,
    state: AuthState,
    token: InitiatorAuthToken,
    peer_pairing_key: Option<PublicKeyBytes>,
}

impl AuthSession {
    /// A session that has just accepted `token` on `conn`.
    pub fn new(conn: ConnectionId, token: InitiatorAuthToken) -> Self {
        Self {
            conn,
            state: AuthState::TokenReceived,
            token,
            peer_pairing_key: None,
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.conn
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn token(&self) -> &InitiatorAuthToken {
        &self.token
    }

    pub fn peer_pairing_key(&self) -> Option<&PublicKeyBytes> {
        self.peer_pairing_key.as_ref()
    }

    pub(crate) fn advance(&mut self, next: AuthState) {
        tracing::debug!(conn = self.conn, from = %self.state, to = %next, "auth session transition");
        self.state = next;
    }

    pub(crate) fn set_peer_pairing_key(&mut self, key: PublicKeyBytes) {
        self.peer_pairing_key = Some(key);
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("conn", &self.conn)
            .field("state", &self.state)
            .field("key_id", &self.token.key_id)
            .finish_non_exhaustive()
    }
}

impl Zeroize for AuthSession {
    fn zeroize(&mut self) {
        self.state = AuthState::Idle;
        self.token.format = 0;
        self.token.key_id = 0;
        self.token.signature.zeroize();
        self.token.random.zeroize();
        self.peer_pairing_key.zeroize();
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.zeroize();
    }
}
