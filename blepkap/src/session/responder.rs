// BLE-PKAP responder: drives authentication sessions from transport events.
//
// Every hook runs synchronously on the transport's dispatch loop. Failures
// never escape as panics; they reset the connection to Idle through
// `abort`, which also wipes the published token.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ResponderConfig;
use crate::crypto::keys::{IdentityKeyPair, PRIVATE_KEY_LEN};
use crate::directory::PeerKeyDirectory;
use crate::error::{PkapError, Result};
use crate::oob::{hex, LescOobData, OobConfirm};
use crate::session::state::{AuthSession, AuthState};
use crate::session::table::SessionTable;
use crate::token::{InitiatorAuthToken, ResponderAuthToken};
use crate::transport::{PairingAccept, PairingRequest, PairingTransport, SecurityLevel};
use crate::{ConnectionId, KeyId, PublicKeyBytes};

/// Answer to the link layer's request for peer OOB data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OobReply {
    /// The initiator authenticated; hand this data to the link layer.
    Confirmed(LescOobData),
    /// Authentication failed; the link layer gets [`LescOobData::invalid`].
    Rejected(PkapError),
}

impl OobReply {
    /// The OOB data to give the link layer. Never empty.
    pub fn oob_data(&self) -> LescOobData {
        match self {
            OobReply::Confirmed(data) => *data,
            OobReply::Rejected(_) => LescOobData::invalid(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, OobReply::Confirmed(_))
    }

    pub fn error(&self) -> Option<&PkapError> {
        match self {
            OobReply::Confirmed(_) => None,
            OobReply::Rejected(err) => Some(err),
        }
    }
}

/// A connection whose peer completed BLE-PKAP authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedPeer {
    pub conn: ConnectionId,
    pub key_id: KeyId,
}

/// Responder side of BLE-PKAP.
pub struct PkapResponder<D, O, T> {
    config: ResponderConfig,
    identity: IdentityKeyPair,
    directory: D,
    oob: O,
    transport: T,
    sessions: SessionTable,
    /// Peers authenticated on live connections, cleared on disconnect.
    authenticated: HashMap<ConnectionId, KeyId>,
}

impl<D, O, T> PkapResponder<D, O, T>
where
    D: PeerKeyDirectory,
    O: OobConfirm,
    T: PairingTransport,
{
    /// Create a responder with default settings and the given identity.
    pub fn initialize(
        local_key_id: KeyId,
        local_private_key: &[u8; PRIVATE_KEY_LEN],
        directory: D,
        oob: O,
        transport: T,
    ) -> Result<Self> {
        Self::with_config(
            ResponderConfig::with_key_id(local_key_id),
            local_private_key,
            directory,
            oob,
            transport,
        )
    }

    pub fn with_config(
        config: ResponderConfig,
        local_private_key: &[u8; PRIVATE_KEY_LEN],
        directory: D,
        oob: O,
        transport: T,
    ) -> Result<Self> {
        config.validate()?;
        let identity = IdentityKeyPair::from_private_key(local_private_key)?;
        info!(
            key_id = config.local_key_id,
            max_sessions = config.max_sessions,
            required_security = %config.required_security,
            "BLE-PKAP responder initialized"
        );
        Ok(Self {
            sessions: SessionTable::new(config.max_sessions),
            config,
            identity,
            directory,
            oob,
            transport,
            authenticated: HashMap::new(),
        })
    }

    // ── Transport hooks ─────────────────────────────────────────────────

    /// The initiator wrote the auth characteristic.
    ///
    /// On success the connection moves to `TokenReceived`. A malformed
    /// token or unknown key id leaves it `Idle`. A write while a session is
    /// pending is refused and the pending session is left untouched.
    pub fn on_token_written(&mut self, conn: ConnectionId, bytes: &[u8]) -> Result<KeyId> {
        if let Some(session) = self.sessions.get(conn) {
            warn!(conn, state = %session.state(), "auth token write while authentication pending");
            return Err(PkapError::SessionBusy(conn));
        }

        // The written value must not be readable back.
        self.transport.clear_token(conn);

        let token = InitiatorAuthToken::decode(bytes).map_err(|e| {
            warn!(conn, len = bytes.len(), error = %e, "invalid initiator auth token");
            PkapError::from(e)
        })?;
        if !self.directory.is_known(token.key_id) {
            warn!(conn, key_id = token.key_id, "initiator auth token from unknown key id");
            return Err(PkapError::UnknownKeyId(token.key_id));
        }

        let key_id = token.key_id;
        self.sessions.insert(AuthSession::new(conn, token)).map_err(|e| {
            warn!(conn, error = %e, "cannot start auth session");
            e
        })?;
        info!(conn, key_id, "initiator auth token received");
        Ok(key_id)
    }

    /// The peer sent a pairing request. Only LESC OOB pairing backed by a
    /// stored token is accepted.
    pub fn on_security_params_requested(
        &mut self,
        conn: ConnectionId,
        request: PairingRequest,
    ) -> Result<PairingAccept> {
        debug!(conn, lesc = request.lesc, oob = request.oob, "security params requested");
        let result = self.start_oob_pairing(conn, request);
        if let Err(err) = &result {
            self.abort(conn, err);
        }
        result
    }

    /// The link layer delivered the peer's LESC pairing public key.
    pub fn on_peer_pairing_key_received(
        &mut self,
        conn: ConnectionId,
        peer_public_key: &PublicKeyBytes,
    ) -> Result<()> {
        let result = self
            .sessions
            .expect(conn, AuthState::OobPairingStarted, "peer pairing key")
            .map(|session| {
                session.set_peer_pairing_key(*peer_public_key);
                session.advance(AuthState::PeerKeyReceived);
            });
        if let Err(err) = &result {
            self.abort(conn, err);
        }
        result
    }

    /// The link layer needs the peer's OOB data to check its confirm value.
    ///
    /// This is where the initiator is authenticated. Any failure yields
    /// [`OobReply::Rejected`], whose data fails the pairing.
    pub fn on_oob_confirmation_data_needed(&mut self, conn: ConnectionId) -> OobReply {
        match self.authenticate_initiator(conn) {
            Ok(data) => OobReply::Confirmed(data),
            Err(err) => {
                self.abort(conn, &err);
                OobReply::Rejected(err)
            }
        }
    }

    /// The link layer reports the outcome of pairing.
    pub fn on_authentication_status(
        &mut self,
        conn: ConnectionId,
        succeeded: bool,
        level: SecurityLevel,
    ) -> Result<AuthenticatedPeer> {
        match self.finish(conn, succeeded, level) {
            Ok(peer) => {
                self.sessions.remove(conn);
                self.authenticated.insert(conn, peer.key_id);
                info!(conn, key_id = peer.key_id, %level, "BLE-PKAP authentication complete");
                Ok(peer)
            }
            Err(err) => {
                self.abort(conn, &err);
                Err(err)
            }
        }
    }

    /// The connection went away. Clears everything regardless of state.
    pub fn on_disconnect(&mut self, conn: ConnectionId) {
        let last = self.sessions.remove(conn).unwrap_or(AuthState::Idle);
        self.authenticated.remove(&conn);
        self.transport.clear_token(conn);
        info!(conn, last_state = %last, "connection closed; auth state cleared");
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Current handshake state of `conn`.
    pub fn state(&self, conn: ConnectionId) -> AuthState {
        self.sessions.state(conn)
    }

    /// Key id of the peer authenticated on `conn`, if any.
    pub fn authenticated_peer(&self, conn: ConnectionId) -> Option<KeyId> {
        self.authenticated.get(&conn).copied()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    pub fn local_public_key(&self) -> PublicKeyBytes {
        self.identity.public_key_bytes()
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn start_oob_pairing(
        &mut self,
        conn: ConnectionId,
        request: PairingRequest,
    ) -> Result<PairingAccept> {
        if !request.is_lesc_oob() {
            return Err(PkapError::OobPairingRequired);
        }
        let session = self
            .sessions
            .expect(conn, AuthState::TokenReceived, "security params request")?;
        session.advance(AuthState::OobPairingStarted);
        info!(conn, "starting authenticated LESC OOB pairing");

        Ok(PairingAccept {
            lesc: true,
            oob: true,
            bond: false,
            mitm: false,
            min_key_size: self.config.min_key_size,
            max_key_size: self.config.max_key_size,
            local_pairing_key: self.transport.local_pairing_key(),
        })
    }

    fn authenticate_initiator(&mut self, conn: ConnectionId) -> Result<LescOobData> {
        let session = self
            .sessions
            .expect(conn, AuthState::PeerKeyReceived, "OOB data request")?;
        let peer_key = *session.peer_pairing_key().ok_or(PkapError::UnexpectedState {
            conn,
            state: AuthState::OobPairingStarted.label(),
            event: "OOB data request",
        })?;
        let token = session.token();

        let confirm = self.oob.confirm(&peer_key, &token.random);
        debug!(conn, confirm = %hex(confirm.as_bytes()), "expected initiator confirmation value");

        let initiator_key = self
            .directory
            .public_key_for(token.key_id)
            .ok_or(PkapError::UnknownKeyId(token.key_id))?;
        token.check_signature(&confirm, &initiator_key)?;
        let key_id = token.key_id;
        let random = token.random;

        let response = ResponderAuthToken::generate(self.config.local_key_id, &confirm, &self.identity)?;
        self.transport.publish_token(conn, &response.to_bytes());
        session.advance(AuthState::PeerAuthenticated);
        info!(conn, key_id, "initiator authenticated; responder auth token published");

        Ok(LescOobData { random, confirm })
    }

    fn finish(
        &mut self,
        conn: ConnectionId,
        succeeded: bool,
        level: SecurityLevel,
    ) -> Result<AuthenticatedPeer> {
        let session = self
            .sessions
            .expect(conn, AuthState::PeerAuthenticated, "authentication status")?;
        if !succeeded {
            return Err(PkapError::PairingFailed(conn));
        }
        if level < self.config.required_security {
            return Err(PkapError::InsufficientSecurity {
                achieved: level.as_u8(),
                required: self.config.required_security.as_u8(),
            });
        }
        session.advance(AuthState::Complete);
        Ok(AuthenticatedPeer {
            conn,
            key_id: session.token().key_id,
        })
    }

    /// The single failure path: wipe all auth state for `conn` and the published token.
    fn abort(&mut self, conn: ConnectionId, err: &PkapError) {
        let last = self.sessions.remove(conn).unwrap_or(AuthState::Idle);
        self.authenticated.remove(&conn);
        self.transport.clear_token(conn);
        warn!(conn, last_state = %last, error = %err, "BLE-PKAP authentication aborted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::hash_sha256;
    use crate::directory::StaticKeyDirectory;
    use crate::oob::{ConfirmValue, OobRandom};

    #[derive(Default)]
    struct RecordingTransport {
        published: HashMap<ConnectionId, Vec<u8>>,
        clears: usize,
    }

    impl PairingTransport for RecordingTransport {
        fn local_pairing_key(&self) -> PublicKeyBytes {
            [0x77; 64]
        }

        fn publish_token(&mut self, conn: ConnectionId, token: &[u8]) {
            self.published.insert(conn, token.to_vec());
        }

        fn clear_token(&mut self, conn: ConnectionId) {
            self.clears += 1;
            self.published.remove(&conn);
        }
    }

    fn confirm_fn(pk: &PublicKeyBytes, r: &OobRandom) -> ConfirmValue {
        let mut input = pk.to_vec();
        input.extend_from_slice(r.as_bytes());
        let mut c = [0u8; 16];
        c.copy_from_slice(&hash_sha256(&input)[..16]);
        ConfirmValue(c)
    }

    type TestResponder = PkapResponder<
        StaticKeyDirectory,
        fn(&PublicKeyBytes, &OobRandom) -> ConfirmValue,
        RecordingTransport,
    >;

    fn setup() -> (TestResponder, IdentityKeyPair) {
        let initiator = IdentityKeyPair::generate();
        let responder_key = IdentityKeyPair::generate();
        let dir = StaticKeyDirectory::new()
            .with_key(1, initiator.public_key_bytes())
            .unwrap();
        let responder = PkapResponder::initialize(
            2,
            &responder_key.private_key_bytes(),
            dir,
            confirm_fn as fn(&PublicKeyBytes, &OobRandom) -> ConfirmValue,
            RecordingTransport::default(),
        )
        .unwrap();
        (responder, initiator)
    }

    fn initiator_token(kp: &IdentityKeyPair, peer_key: &PublicKeyBytes, random: OobRandom) -> Vec<u8> {
        let c = confirm_fn(peer_key, &random);
        InitiatorAuthToken::generate(1, &c, &random, kp)
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn happy_path_reaches_complete() {
        let (mut responder, initiator) = setup();
        let peer_key = [0x21; 64];
        let token = initiator_token(&initiator, &peer_key, OobRandom([9; 16]));

        assert_eq!(responder.on_token_written(5, &token), Ok(1));
        let accept = responder
            .on_security_params_requested(5, PairingRequest::lesc_oob())
            .unwrap();
        assert_eq!(accept.local_pairing_key, [0x77; 64]);
        responder.on_peer_pairing_key_received(5, &peer_key).unwrap();

        let reply = responder.on_oob_confirmation_data_needed(5);
        assert!(reply.is_confirmed());
        assert_eq!(reply.oob_data().random, OobRandom([9; 16]));
        assert_eq!(responder.state(5), AuthState::PeerAuthenticated);
        assert_eq!(responder.transport().published[&5].len(), ResponderAuthToken::LEN);

        let peer = responder
            .on_authentication_status(5, true, SecurityLevel::LescAuthenticated)
            .unwrap();
        assert_eq!(peer, AuthenticatedPeer { conn: 5, key_id: 1 });
        assert_eq!(responder.state(5), AuthState::Idle);
        assert_eq!(responder.authenticated_peer(5), Some(1));
        // Still readable by the initiator after pairing.
        assert!(responder.transport().published.contains_key(&5));
    }

    #[test]
    fn oob_request_without_token_is_rejected() {
        let (mut responder, _) = setup();
        let reply = responder.on_oob_confirmation_data_needed(8);
        assert!(reply.oob_data().is_invalid_marker());
        assert!(matches!(reply.error(), Some(PkapError::UnexpectedState { .. })));
    }

    #[test]
    fn abort_clears_published_token() {
        let (mut responder, initiator) = setup();
        let peer_key = [0x21; 64];
        let token = initiator_token(&initiator, &peer_key, OobRandom([9; 16]));
        responder.on_token_written(5, &token).unwrap();
        responder
            .on_security_params_requested(5, PairingRequest::lesc_oob())
            .unwrap();
        responder.on_peer_pairing_key_received(5, &peer_key).unwrap();
        assert!(responder.on_oob_confirmation_data_needed(5).is_confirmed());

        let err = responder
            .on_authentication_status(5, true, SecurityLevel::Unauthenticated)
            .unwrap_err();
        assert_eq!(err, PkapError::InsufficientSecurity { achieved: 2, required: 4 });
        assert!(responder.transport().published.is_empty());
        assert_eq!(responder.authenticated_peer(5), None);
    }
}
