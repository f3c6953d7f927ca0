// Cryptographic primitives: SHA-256 and ECDSA-P256 identity keys.

pub mod hash;
pub mod keys;
