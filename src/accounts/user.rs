//! The user record.

use chrono::{DateTime, Utc};

use crate::crypto::KeySalt;
use crate::identity::{Identity, OwnerId};

/// A registered user.
///
/// The password verifier stays private to the accounts module; nothing
/// outside it needs to see the hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: OwnerId,
    pub email: String,
    pub key_salt: KeySalt,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub(super) password_hash: String,
}

impl User {
    /// The identity the vault core needs for this user.
    pub fn identity(&self) -> Identity {
        Identity {
            owner: self.id,
            key_salt: self.key_salt.clone(),
        }
    }
}
