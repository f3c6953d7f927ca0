//! Per-connection authentication sessions.
//!
//! ```text
//!   Initiator                                   Responder
//!     |--- write InitiatorAuthToken ------------->|  Idle -> TokenReceived
//!     |--- pairing request (LESC, OOB) ---------->|  -> OobPairingStarted
//!     |<-- pairing public key exchange ---------->|  -> PeerKeyReceived
//!     |                      link layer asks OOB  |  verify token, publish
//!     |                                           |  ResponderAuthToken -> PeerAuthenticated
//!     |<== DHKey check / encryption =============>|
//!     |                      auth status (L4)     |  -> Complete
//!     |--- read ResponderAuthToken -------------->|
//! ```

pub mod responder;
pub mod state;
pub mod table;
