// Responder configuration. Key material is deliberately absent; private
// keys are handed to `PkapResponder::initialize` by the embedding firmware.

use serde::{Deserialize, Serialize};

use crate::error::{PkapError, Result};
use crate::transport::SecurityLevel;
use crate::KeyId;

/// Smallest LE encryption key size permitted by Bluetooth Core.
pub const MIN_ENCRYPTION_KEY_SIZE: u8 = 7;
/// Largest (and preferred) LE encryption key size.
pub const MAX_ENCRYPTION_KEY_SIZE: u8 = 16;

/// Settings for a [`PkapResponder`](crate::PkapResponder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Key id placed in responder tokens.
    pub local_key_id: KeyId,
    /// Maximum concurrently authenticating connections.
    pub max_sessions: usize,
    /// Weakest link security accepted at the final auth-status event.
    pub required_security: SecurityLevel,
    pub min_key_size: u8,
    pub max_key_size: u8,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            local_key_id: 1,
            max_sessions: 4,
            required_security: SecurityLevel::LescAuthenticated,
            min_key_size: MAX_ENCRYPTION_KEY_SIZE,
            max_key_size: MAX_ENCRYPTION_KEY_SIZE,
        }
    }
}

impl ResponderConfig {
    /// Default settings with the given local key id.
    pub fn with_key_id(local_key_id: KeyId) -> Self {
        Self {
            local_key_id,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config document. Missing fields take
    /// their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| PkapError::Config(format!("{e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PkapError::Config(format!("{e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sessions == 0 {
            return Err(PkapError::Config("max_sessions must be at least 1".into()));
        }
        let range = MIN_ENCRYPTION_KEY_SIZE..=MAX_ENCRYPTION_KEY_SIZE;
        if !range.contains(&self.min_key_size) || !range.contains(&self.max_key_size) {
            return Err(PkapError::Config(format!(
                "key sizes must be within {MIN_ENCRYPTION_KEY_SIZE}..={MAX_ENCRYPTION_KEY_SIZE}"
            )));
        }
        if self.min_key_size > self.max_key_size {
            return Err(PkapError::Config(format!(
                "min_key_size {} exceeds max_key_size {}",
                self.min_key_size, self.max_key_size
            )));
        }
        Ok(())
    }
}
