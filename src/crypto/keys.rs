//! In-memory key material.

use std::fmt;

use zeroize::Zeroize;

/// Length of a derived entry key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A user's 32-byte entry key that automatically zeroes its memory when
/// dropped.
///
/// Produced by [`super::KeyDeriver::derive`] and meant to live for a single
/// operation. It is never persisted and its `Debug` output is redacted so it
/// cannot end up in logs.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct UserKey {
    bytes: [u8; KEY_LEN],
}

impl UserKey {
    /// Create a new `UserKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub(crate) fn zeroed() -> Self {
        Self::new([0u8; KEY_LEN])
    }

    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }
}

impl fmt::Debug for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_print_bytes() {
        let key = UserKey::new([0x41; KEY_LEN]);
        let printed = format!("{key:?}");
        assert_eq!(printed, "UserKey(<redacted>)");
    }
}
