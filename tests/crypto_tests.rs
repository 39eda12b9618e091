//! Integration tests for the NoteVault crypto module.

use std::collections::HashSet;

use notevault::config::ServerSecret;
use notevault::crypto::{open, open_to_string, seal, Argon2Params, KeyDeriver, KeySalt, UserKey};
use notevault::errors::NoteVaultError;

/// Cheap Argon2 settings so the tests stay fast.
fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8192,
        iterations: 1,
        parallelism: 1,
    }
}

fn deriver(secret: &str) -> KeyDeriver {
    KeyDeriver::new(ServerSecret::new(secret).unwrap(), fast_params()).unwrap()
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn generated_salts_are_unique_hex() {
    let a = KeySalt::generate();
    let b = KeySalt::generate();
    assert_ne!(a.as_str(), b.as_str());
    assert_eq!(a.as_str().len(), 32, "16 random bytes, hex encoded");
    assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn short_server_secret_is_rejected() {
    assert!(ServerSecret::new("too-short").is_err());
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = UserKey::new([0xABu8; 32]);
    let plaintext = "the pin is 4821";

    let sealed = seal(&key, plaintext.as_bytes()).expect("seal should succeed");
    assert_eq!(sealed.ciphertext.len(), plaintext.len());

    let recovered = open_to_string(&key, &sealed).expect("open should succeed");
    assert_eq!(recovered.as_str(), plaintext);
}

#[test]
fn empty_plaintext_still_authenticates() {
    let key = UserKey::new([0x01u8; 32]);
    let sealed = seal(&key, b"").unwrap();

    assert!(open(&key, &sealed).unwrap().is_empty());
}

#[test]
fn flipping_any_tag_bit_fails_integrity() {
    let key = UserKey::new([0xCDu8; 32]);
    let sealed = seal(&key, b"integrity matters").unwrap();

    for byte in 0..sealed.tag.len() {
        let mut tampered = sealed.clone();
        tampered.tag[byte] ^= 0x01;
        assert!(
            matches!(open(&key, &tampered), Err(NoteVaultError::IntegrityFailure)),
            "tag byte {byte} flipped must not verify"
        );
    }
}

#[test]
fn tampered_ciphertext_fails_integrity() {
    let key = UserKey::new([0xCDu8; 32]);
    let mut sealed = seal(&key, b"integrity matters").unwrap();
    sealed.ciphertext[3] ^= 0x80;

    assert!(matches!(
        open(&key, &sealed),
        Err(NoteVaultError::IntegrityFailure)
    ));
}

#[test]
fn tampered_nonce_fails_integrity() {
    let key = UserKey::new([0xCDu8; 32]);
    let mut sealed = seal(&key, b"integrity matters").unwrap();
    sealed.nonce[0] ^= 0xFF;

    assert!(matches!(
        open(&key, &sealed),
        Err(NoteVaultError::IntegrityFailure)
    ));
}

#[test]
fn open_with_wrong_key_fails_integrity() {
    let key = UserKey::new([0x11u8; 32]);
    let wrong_key = UserKey::new([0x22u8; 32]);
    let sealed = seal(&key, b"TOP_SECRET=42").unwrap();

    assert!(matches!(
        open(&wrong_key, &sealed),
        Err(NoteVaultError::IntegrityFailure)
    ));
}

#[test]
fn nonces_are_unique_across_many_seals() {
    let key = UserKey::new([0x42u8; 32]);
    let mut seen = HashSet::new();

    for _ in 0..1000 {
        let sealed = seal(&key, b"same plaintext every time").unwrap();
        assert!(seen.insert(sealed.nonce), "nonce reused");
    }
}

#[test]
fn same_plaintext_seals_differently() {
    let key = UserKey::new([0x42u8; 32]);
    let a = seal(&key, b"hello").unwrap();
    let b = seal(&key, b"hello").unwrap();

    assert_ne!(a.ciphertext, b.ciphertext);
    assert_ne!(a.tag, b.tag);
}

#[test]
fn derived_key_opens_only_its_own_payloads() {
    let d = deriver("a-long-enough-server-secret");
    let alice = d.derive(&KeySalt::generate()).unwrap();
    let bob = d.derive(&KeySalt::generate()).unwrap();

    let sealed = seal(&alice, b"alice only").unwrap();
    assert_eq!(open(&alice, &sealed).unwrap().as_slice(), b"alice only");
    assert!(open(&bob, &sealed).is_err());
}
