// BLE-PKAP error types

use thiserror::Error;

use crate::{ConnectionId, KeyId};

/// Reasons a received token could not be decoded.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("wrong token length: expected {expected}, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unsupported token format: {0}")]
    UnsupportedVersion(u8),
}

/// Top-level error type for the BLE-PKAP crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PkapError {
    // ── Token errors ────────────────────────────────────────────────────
    #[error("token decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    // ── Crypto errors ───────────────────────────────────────────────────
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature verification failed")]
    SignatureInvalid,

    #[error("unknown key id: {0}")]
    UnknownKeyId(KeyId),

    // ── Session errors ──────────────────────────────────────────────────
    #[error("unexpected {event} on connection {conn} in state {state}")]
    UnexpectedState {
        conn: ConnectionId,
        state: &'static str,
        event: &'static str,
    },

    #[error("authentication already in progress on connection {0}")]
    SessionBusy(ConnectionId),

    #[error("session table full ({0} sessions)")]
    SessionTableFull(usize),

    #[error("peer did not request LE Secure Connections OOB pairing")]
    OobPairingRequired,

    #[error("insufficient security: achieved {achieved}, required {required}")]
    InsufficientSecurity { achieved: u8, required: u8 },

    #[error("pairing failed on connection {0}")]
    PairingFailed(ConnectionId),

    // ── Configuration ───────────────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, PkapError>;
