use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ClamError, Result};

/// Installation-level configuration, loaded from `<data-dir>/config.toml`.
///
/// Every field has a sensible default so Clam works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the data dir) where vault files are stored.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Registry metadata file (relative to the data dir).
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,

    /// Vault created automatically when an account is added before any
    /// vault exists.
    #[serde(default = "default_vault_name")]
    pub default_vault_name: String,

    /// Emit debug logs on stderr.
    #[serde(default)]
    pub debug: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    "vaults".to_string()
}

fn default_metadata_file() -> String {
    "meta/meta".to_string()
}

fn default_vault_name() -> String {
    "default_vault".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            metadata_file: default_metadata_file(),
            default_vault_name: default_vault_name(),
            debug: false,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data dir.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<data_dir>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ClamError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the vault directory.
    ///
    /// Example: `~/.clam/vaults`
    pub fn vault_dir(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.vault_dir)
    }

    /// Full path to the registry metadata file.
    ///
    /// Example: `~/.clam/meta/meta`
    pub fn metadata_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.metadata_file)
    }
}

/// Resolve the data directory: explicit path, then `$HOME/.clam`, then
/// `./.clam`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(".clam"),
        _ => PathBuf::from(".clam"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
