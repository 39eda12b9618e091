use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{NoteVaultError, Result};

/// Project-level configuration, loaded from `.notevault.toml`.
///
/// Every field has a sensible default so NoteVault works out-of-the-box
/// without any config file at all. The server secret is deliberately not
/// part of this file; see [`super::ServerSecret`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the databases.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Page size used by `list` when none is given.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound on the page size a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".notevault".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".notevault.toml";

    /// Load settings from `<project_dir>/.notevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            NoteVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject page settings that would make listing unusable.
    fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(NoteVaultError::ConfigError(
                "max_page_size must be at least 1".into(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(NoteVaultError::ConfigError(format!(
                "default_page_size must be between 1 and {} (got {})",
                self.max_page_size, self.default_page_size
            )));
        }
        Ok(())
    }

    /// Directory holding the databases, resolved against `project_dir`.
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> crate::crypto::kdf::Argon2Params {
        crate::crypto::kdf::Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
