// Peer Key Directory: application-owned map of trusted identity keys.

use std::collections::HashMap;

use crate::crypto::keys::verifying_key_from_raw;
use crate::error::Result;
use crate::{KeyId, PublicKeyBytes};

/// Resolves a key id carried in an auth token to a trusted public key.
///
/// The core only reads the directory; populating it is the embedding
/// application's concern.
pub trait PeerKeyDirectory {
    /// The trusted raw P-256 public key for `key_id`, if any.
    fn public_key_for(&self, key_id: KeyId) -> Option<PublicKeyBytes>;

    /// Whether `key_id` names a trusted key.
    fn is_known(&self, key_id: KeyId) -> bool {
        self.public_key_for(key_id).is_some()
    }
}

impl<D: PeerKeyDirectory + ?Sized> PeerKeyDirectory for &D {
    fn public_key_for(&self, key_id: KeyId) -> Option<PublicKeyBytes> {
        (**self).public_key_for(key_id)
    }

    fn is_known(&self, key_id: KeyId) -> bool {
        (**self).is_known(key_id)
    }
}

/// In-memory directory backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyDirectory {
    keys: HashMap<KeyId, PublicKeyBytes>,
}

impl StaticKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trusted key. The key must be a valid P-256 point.
    /// Replaces any key previously registered under `key_id`.
    pub fn insert(&mut self, key_id: KeyId, public_key: PublicKeyBytes) -> Result<()> {
        verifying_key_from_raw(&public_key)?;
        self.keys.insert(key_id, public_key);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_key(mut self, key_id: KeyId, public_key: PublicKeyBytes) -> Result<Self> {
        self.insert(key_id, public_key)?;
        Ok(self)
    }

    pub fn remove(&mut self, key_id: KeyId) -> Option<PublicKeyBytes> {
        self.keys.remove(&key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl PeerKeyDirectory for StaticKeyDirectory {
    fn public_key_for(&self, key_id: KeyId) -> Option<PublicKeyBytes> {
        self.keys.get(&key_id).copied()
    }

    fn is_known(&self, key_id: KeyId) -> bool {
        self.keys.contains_key(&key_id)
    }
}
