//! Session table keyed by connection id.
//!
//! Bounded by `max_sessions`; a connection holds at most one session.

use std::collections::HashMap;

use crate::error::{PkapError, Result};
use crate::session::state::{AuthSession, AuthState};
use crate::ConnectionId;

/// All in-flight authentication sessions.
#[derive(Debug)]
pub struct SessionTable {
    sessions: HashMap<ConnectionId, AuthSession>,
    capacity: usize,
}

impl SessionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Bind a new session to its connection.
    pub fn insert(&mut self, session: AuthSession) -> Result<()> {
        let conn = session.connection();
        if self.sessions.contains_key(&conn) {
            return Err(PkapError::SessionBusy(conn));
        }
        if self.sessions.len() >= self.capacity {
            return Err(PkapError::SessionTableFull(self.capacity));
        }
        self.sessions.insert(conn, session);
        Ok(())
    }

    pub fn get(&self, conn: ConnectionId) -> Option<&AuthSession> {
        self.sessions.get(&conn).filter(|s| s.connection() == conn)
    }

    /// The session for `conn`, provided it sits in `expected`.
    ///
    /// `event` names the trigger for the error report.
    pub fn expect(
        &mut self,
        conn: ConnectionId,
        expected: AuthState,
        event: &'static str,
    ) -> Result<&mut AuthSession> {
        match self.sessions.get_mut(&conn) {
            Some(session) if session.connection() == conn && session.state() == expected => {
                Ok(session)
            }
            other => Err(PkapError::UnexpectedState {
                conn,
                state: other.map_or(AuthState::Idle, |s| s.state()).label(),
                event,
            }),
        }
    }

    /// Unbind and wipe the session for `conn`, returning its last state.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<AuthState> {
        self.sessions.remove(&conn).map(|session| session.state())
    }

    /// Current state for `conn`; `Idle` when no session exists.
    pub fn state(&self, conn: ConnectionId) -> AuthState {
        self.get(conn).map_or(AuthState::Idle, AuthSession::state)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oob::OobRandom;
    use crate::token::InitiatorAuthToken;

    fn session(conn: ConnectionId) -> AuthSession {
        AuthSession::new(
            conn,
            InitiatorAuthToken {
                format: 1,
                key_id: 1,
                signature: [1; 64],
                random: OobRandom([2; 16]),
            },
        )
    }

    #[test]
    fn insert_and_lookup() {
        let mut table = SessionTable::new(2);
        table.insert(session(10)).unwrap();
        assert_eq!(table.state(10), AuthState::TokenReceived);
        assert_eq!(table.state(11), AuthState::Idle);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn duplicate_connection_is_busy() {
        let mut table = SessionTable::new(2);
        table.insert(session(10)).unwrap();
        assert_eq!(table.insert(session(10)), Err(PkapError::SessionBusy(10)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn capacity_enforced() {
        let mut table = SessionTable::new(1);
        table.insert(session(1)).unwrap();
        assert_eq!(table.insert(session(2)), Err(PkapError::SessionTableFull(1)));
    }

    #[test]
    fn expect_checks_state() {
        let mut table = SessionTable::new(2);
        table.insert(session(4)).unwrap();
        assert!(table.expect(4, AuthState::TokenReceived, "test").is_ok());
        let err = table.expect(4, AuthState::PeerKeyReceived, "test").unwrap_err();
        assert_eq!(
            err,
            PkapError::UnexpectedState {
                conn: 4,
                state: "TokenReceived",
                event: "test"
            }
        );
        let err = table.expect(5, AuthState::TokenReceived, "test").unwrap_err();
        assert!(matches!(err, PkapError::UnexpectedState { state: "Idle", .. }));
    }

    #[test]
    fn remove_returns_last_state() {
        let mut table = SessionTable::new(2);
        table.insert(session(4)).unwrap();
        assert_eq!(table.remove(4), Some(AuthState::TokenReceived));
        assert_eq!(table.remove(4), None);
        assert!(table.is_empty());
    }
}
