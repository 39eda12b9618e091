use thiserror::Error;

/// All errors that can occur in NoteVault.
#[derive(Debug, Error)]
pub enum NoteVaultError {
    // --- Input errors ---
    #[error("Invalid input: {0}")]
    Validation(String),

    // --- Vault errors ---
    /// Returned both for entries that do not exist and for entries owned by
    /// someone else. Callers must not be able to tell the two apart.
    #[error("Entry not found")]
    EntryNotFound,

    #[error("Decryption failed — integrity check did not pass")]
    IntegrityFailure,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Account errors ---
    #[error("A user with email '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    PasswordHashFailed(String),

    // --- Storage errors ---
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    // --- Config errors ---
    #[error("Config error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Coarse classification used by front ends to decide what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Integrity,
    Auth,
    Internal,
}

impl NoteVaultError {
    /// Classify this error.
    ///
    /// Everything that is not the caller's fault (crypto primitives, storage,
    /// config) is `Internal` and should be reported without details.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::CommandFailed(_) => ErrorKind::Validation,
            Self::EntryNotFound => ErrorKind::NotFound,
            Self::IntegrityFailure => ErrorKind::Integrity,
            Self::UserAlreadyExists(_) | Self::InvalidCredentials => ErrorKind::Auth,
            Self::EncryptionFailed(_)
            | Self::KeyDerivationFailed(_)
            | Self::PasswordHashFailed(_)
            | Self::Database(_)
            | Self::Storage(_)
            | Self::ConfigError(_)
            | Self::Io(_)
            | Self::SerializationError(_)
            | Self::AuditError(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience type alias for NoteVault results.
pub type Result<T> = std::result::Result<T, NoteVaultError>;
