//! AES-256-GCM authenticated encryption with detached nonce and tag.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce. The result
//! keeps ciphertext, nonce and the 16-byte authentication tag as three
//! separate values so the store can persist them in separate columns.
//! No associated data is used.

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::{Zeroize, Zeroizing};

use super::keys::UserKey;
use crate::errors::{NoteVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Output of [`seal`]: everything needed to [`open`] the plaintext again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl SealedPayload {
    /// Rebuild a payload from its stored hex columns.
    ///
    /// Malformed values can never authenticate, so they are reported as an
    /// integrity failure rather than a storage error.
    pub fn from_hex(ciphertext: &str, nonce: &str, tag: &str) -> Result<Self> {
        let ciphertext = hex::decode(ciphertext).map_err(|_| NoteVaultError::IntegrityFailure)?;
        let nonce = decode_fixed::<NONCE_LEN>(nonce)?;
        let tag = decode_fixed::<TAG_LEN>(tag)?;
        Ok(Self {
            ciphertext,
            nonce,
            tag,
        })
    }

    pub fn ciphertext_hex(&self) -> String {
        hex::encode(&self.ciphertext)
    }

    pub fn nonce_hex(&self) -> String {
        hex::encode(self.nonce)
    }

    pub fn tag_hex(&self) -> String {
        hex::encode(self.tag)
    }
}

fn decode_fixed<const N: usize>(value: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(value).map_err(|_| NoteVaultError::IntegrityFailure)?;
    bytes
        .try_into()
        .map_err(|_| NoteVaultError::IntegrityFailure)
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &UserKey, plaintext: &[u8]) -> Result<SealedPayload> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| NoteVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let mut buffer = plaintext.to_vec();
    let tag = match cipher.encrypt_in_place_detached(&nonce, b"", &mut buffer) {
        Ok(tag) => tag,
        Err(e) => {
            buffer.zeroize();
            return Err(NoteVaultError::EncryptionFailed(format!(
                "encryption error: {e}"
            )));
        }
    };

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&nonce);
    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(SealedPayload {
        ciphertext: buffer,
        nonce: nonce_bytes,
        tag: tag_bytes,
    })
}

/// Decrypt a payload produced by [`seal`].
///
/// Fails with `IntegrityFailure` if the tag does not verify. The working
/// buffer is wiped on failure, so no partial plaintext escapes.
pub fn open(key: &UserKey, sealed: &SealedPayload) -> Result<Zeroizing<Vec<u8>>> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| NoteVaultError::IntegrityFailure)?;

    let nonce = Nonce::from_slice(&sealed.nonce);
    let tag = Tag::from_slice(&sealed.tag);

    let mut buffer = Zeroizing::new(sealed.ciphertext.clone());
    cipher
        .decrypt_in_place_detached(nonce, b"", &mut buffer, tag)
        .map_err(|_| NoteVaultError::IntegrityFailure)?;

    Ok(buffer)
}

/// Decrypt a payload and interpret it as UTF-8 text.
pub fn open_to_string(key: &UserKey, sealed: &SealedPayload) -> Result<Zeroizing<String>> {
    let mut plaintext = open(key, sealed)?;

    // Move the bytes out so only one copy exists; the emptied wrapper is harmless.
    let bytes = std::mem::take(&mut *plaintext);
    String::from_utf8(bytes).map(Zeroizing::new).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        NoteVaultError::SerializationError("entry content is not valid UTF-8".to_string())
    })
}
