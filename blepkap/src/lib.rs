// BLE-PKAP: Public-Key Authenticated Pairing for LE Secure Connections OOB
//
// Crate root: module declarations and public re-exports.

pub mod config;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod ffi;
pub mod initiator;
pub mod oob;
pub mod session;
pub mod token;
pub mod transport;

// Re-export key types at crate root for convenience.
pub use config::ResponderConfig;
pub use crypto::keys::IdentityKeyPair;
pub use directory::{PeerKeyDirectory, StaticKeyDirectory};
pub use error::{DecodeError, PkapError, Result};
pub use initiator::PkapInitiator;
pub use oob::{ConfirmValue, LescOobData, OobConfirm, OobRandom};
pub use session::responder::{AuthenticatedPeer, OobReply, PkapResponder};
pub use session::state::AuthState;
pub use token::{InitiatorAuthToken, ResponderAuthToken};
pub use transport::{PairingAccept, PairingRequest, PairingTransport, SecurityLevel};

/// Identifier of a link-layer connection, as assigned by the transport.
pub type ConnectionId = u16;

/// Application-defined selector for a provisioned identity key.
pub type KeyId = u16;

/// Raw uncompressed P-256 public key (X‖Y, 64 bytes).
pub type PublicKeyBytes = [u8; 64];
