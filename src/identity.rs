//! Who is calling, and from where.
//!
//! An [`Identity`] is what the account layer hands to the vault core after a
//! successful authentication. The core trusts it unconditionally; the
//! owner id inside it scopes every storage call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::KeySalt;
use crate::errors::{NoteVaultError, Result};

/// Identifier of a user, and therefore of the owner of vault entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OwnerId {
    type Err = NoteVaultError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| NoteVaultError::Storage(format!("invalid owner id '{s}': {e}")))
    }
}

/// A resolved caller: owner id plus the salt their entry key is derived from.
#[derive(Debug, Clone)]
pub struct Identity {
    pub owner: OwnerId,
    pub key_salt: KeySalt,
}

/// Request provenance recorded with audit events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Origin address of the request (e.g. a client IP, or `local`).
    pub origin: Option<String>,
    /// Client identifier string (e.g. a user agent).
    pub client: Option<String>,
}

impl RequestContext {
    pub fn new(origin: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            client: Some(client.into()),
        }
    }
}
