//! Per-user key derivation using Argon2id.
//!
//! The entry key for a user is `Argon2id(server_secret, user_key_salt)`.
//! There is no stored key anywhere: the same secret and salt always
//! reproduce the same key, and a leaked database alone (salts without the
//! server secret) is useless to an attacker.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::keys::{UserKey, KEY_LEN};
use crate::config::ServerSecret;
use crate::errors::{NoteVaultError, Result};

/// Number of random bytes in a freshly generated key salt.
const SALT_BYTES: usize = 16;

/// Argon2 refuses salts shorter than this.
const MIN_SALT_LEN: usize = 8;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Enforce minimum Argon2 parameters to prevent dangerously weak settings.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(NoteVaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(NoteVaultError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(NoteVaultError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Build the Argon2id hasher for these params.
    pub(crate) fn hasher(&self, output_len: Option<usize>) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, output_len)
            .map_err(|e| NoteVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// A user's key salt: random, generated once at registration, never changed.
///
/// Stored as a hex string. It has nothing to do with the user's password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeySalt(String);

impl KeySalt {
    /// Generate a fresh random salt (16 bytes, hex-encoded).
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a stored salt, rejecting values Argon2 cannot use.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() < MIN_SALT_LEN {
            return Err(NoteVaultError::KeyDerivationFailed(format!(
                "key salt must be at least {MIN_SALT_LEN} bytes"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KeySalt {
    type Error = NoteVaultError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<KeySalt> for String {
    fn from(salt: KeySalt) -> Self {
        salt.0
    }
}

impl fmt::Debug for KeySalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeySalt(<redacted>)")
    }
}

/// Derives per-user entry keys from the server secret.
///
/// Stateless apart from its configuration, so one instance can serve any
/// number of users concurrently.
#[derive(Debug, Clone)]
pub struct KeyDeriver {
    secret: ServerSecret,
    params: Argon2Params,
}

impl KeyDeriver {
    /// Build a deriver, validating the Argon2 params up front.
    pub fn new(secret: ServerSecret, params: Argon2Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { secret, params })
    }

    /// Derive the 32-byte entry key for `salt`.
    ///
    /// The same secret + salt + params always produce the same key.
    pub fn derive(&self, salt: &KeySalt) -> Result<UserKey> {
        let argon2 = self.params.hasher(Some(KEY_LEN))?;

        let mut key = UserKey::zeroed();
        argon2
            .hash_password_into(self.secret.as_bytes(), salt.as_str().as_bytes(), key.as_mut_bytes())
            .map_err(|e| NoteVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

        Ok(key)
    }
}
