// Initiator side of BLE-PKAP.
//
//   1. Obtain local LESC OOB data (confirm C, random R) from the host stack.
//   2. Write create_token(C, R) to the responder's auth characteristic.
//   3. Pair using LESC OOB with (C, R).
//   4. Read the responder token and authenticate_responder(token, C).

use tracing::{info, warn};

use crate::crypto::keys::IdentityKeyPair;
use crate::directory::PeerKeyDirectory;
use crate::error::{PkapError, Result};
use crate::oob::{ConfirmValue, LescOobData};
use crate::token::{InitiatorAuthToken, ResponderAuthToken};
use crate::KeyId;

/// Client-side (initiator) of the BLE-PKAP exchange.
pub struct PkapInitiator<D> {
    key_id: KeyId,
    identity: IdentityKeyPair,
    /// Trusted responder keys.
    responders: D,
}

impl<D: PeerKeyDirectory> PkapInitiator<D> {
    pub fn new(key_id: KeyId, identity: IdentityKeyPair, responders: D) -> Self {
        Self {
            key_id,
            identity,
            responders,
        }
    }

    pub fn key_id(&self) -> KeyId {
        self.key_id
    }

    /// Public half of the initiator identity, for provisioning responders.
    pub fn public_key_bytes(&self) -> crate::PublicKeyBytes {
        self.identity.public_key_bytes()
    }

    /// Build the token for our own OOB data.
    pub fn create_token(&self, local_oob: &LescOobData) -> Result<InitiatorAuthToken> {
        InitiatorAuthToken::generate(self.key_id, &local_oob.confirm, &local_oob.random, &self.identity)
    }

    /// Authenticate the responder from the token it published after pairing.
    ///
    /// `confirm` is the confirmation value of our own OOB data, the same one
    /// our token was signed over.
    pub fn authenticate_responder(&self, token_bytes: &[u8], confirm: &ConfirmValue) -> Result<KeyId> {
        let token = ResponderAuthToken::decode(token_bytes).map_err(|e| {
            warn!(len = token_bytes.len(), error = %e, "invalid responder auth token");
            PkapError::from(e)
        })?;
        let public_key = self.responders.public_key_for(token.key_id).ok_or_else(|| {
            warn!(key_id = token.key_id, "responder auth token from unknown key id");
            PkapError::UnknownKeyId(token.key_id)
        })?;
        token.check_signature(confirm, &public_key).map_err(|e| {
            warn!(key_id = token.key_id, error = %e, "responder authentication failed");
            e
        })?;
        info!(key_id = token.key_id, "responder authenticated");
        Ok(token.key_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticKeyDirectory;
    use crate::oob::OobRandom;

    fn oob() -> LescOobData {
        LescOobData {
            random: OobRandom([3; 16]),
            confirm: ConfirmValue([4; 16]),
        }
    }

    #[test]
    fn create_token_signs_confirm() {
        let kp = IdentityKeyPair::generate();
        let pk = kp.public_key_bytes();
        let initiator = PkapInitiator::new(1, kp, StaticKeyDirectory::new());
        let token = initiator.create_token(&oob()).unwrap();
        assert_eq!(token.key_id, 1);
        assert_eq!(token.random, OobRandom([3; 16]));
        assert!(token.verify(&ConfirmValue([4; 16]), &pk));
    }

    #[test]
    fn responder_token_accepted() {
        let responder = IdentityKeyPair::generate();
        let dir = StaticKeyDirectory::new()
            .with_key(2, responder.public_key_bytes())
            .unwrap();
        let initiator = PkapInitiator::new(1, IdentityKeyPair::generate(), dir);
        let token = ResponderAuthToken::generate(2, &oob().confirm, &responder).unwrap();
        assert_eq!(initiator.authenticate_responder(&token.to_bytes(), &oob().confirm), Ok(2));
    }

    #[test]
    fn unknown_responder_rejected() {
        let responder = IdentityKeyPair::generate();
        let initiator = PkapInitiator::new(1, IdentityKeyPair::generate(), StaticKeyDirectory::new());
        let token = ResponderAuthToken::generate(9, &oob().confirm, &responder).unwrap();
        assert_eq!(
            initiator.authenticate_responder(&token.to_bytes(), &oob().confirm),
            Err(PkapError::UnknownKeyId(9))
        );
    }

    #[test]
    fn responder_signature_over_other_confirm_rejected() {
        let responder = IdentityKeyPair::generate();
        let dir = StaticKeyDirectory::new()
            .with_key(2, responder.public_key_bytes())
            .unwrap();
        let initiator = PkapInitiator::new(1, IdentityKeyPair::generate(), dir);
        let token = ResponderAuthToken::generate(2, &ConfirmValue([0xEE; 16]), &responder).unwrap();
        assert_eq!(
            initiator.authenticate_responder(&token.to_bytes(), &oob().confirm),
            Err(PkapError::SignatureInvalid)
        );
    }
}
