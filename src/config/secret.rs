//! The process-wide server secret.
//!
//! Every user's entry key is derived from this secret plus the user's own
//! key salt. It is read from the environment once at startup and handed to
//! [`crate::crypto::KeyDeriver`] explicitly; nothing reads it from ambient
//! state afterwards.

use std::fmt;

use zeroize::Zeroizing;

use crate::errors::{NoteVaultError, Result};

/// Environment variable holding the server secret.
pub const SERVER_SECRET_ENV: &str = "NOTEVAULT_SERVER_SECRET";

/// Minimum accepted secret length in bytes.
const MIN_SECRET_LEN: usize = 16;

/// Server secret bytes, wiped from memory on drop.
#[derive(Clone)]
pub struct ServerSecret {
    bytes: Zeroizing<Vec<u8>>,
}

impl ServerSecret {
    /// Wrap an explicit secret value (tests, embedding).
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = Zeroizing::new(secret.into());
        if bytes.len() < MIN_SECRET_LEN {
            return Err(NoteVaultError::ConfigError(format!(
                "server secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self { bytes })
    }

    /// Read the secret from `NOTEVAULT_SERVER_SECRET`.
    pub fn from_env() -> Result<Self> {
        let value = std::env::var(SERVER_SECRET_ENV).map_err(|_| {
            NoteVaultError::ConfigError(format!("{SERVER_SECRET_ENV} is not set"))
        })?;
        Self::new(value.into_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerSecret(<redacted>)")
    }
}
