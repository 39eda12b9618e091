//! Cryptographic primitives for NoteVault.
//!
//! This module provides:
//! - Argon2id per-user key derivation from the server secret (`kdf`)
//! - AES-256-GCM sealing with detached nonce and tag (`cipher`)
//! - Zeroizing key wrapper (`keys`)

pub mod cipher;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, KeyDeriver, ...};
pub use cipher::{open, open_to_string, seal, SealedPayload, NONCE_LEN, TAG_LEN};
pub use kdf::{Argon2Params, KeyDeriver, KeySalt};
pub use keys::{UserKey, KEY_LEN};
