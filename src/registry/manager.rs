//! The vault registry: which vaults exist, how to verify their
//! passphrases, and which one is active.
//!
//! The registry is loaded whole from one metadata file, kept in memory,
//! and rewritten whole (atomically) after every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::crypto::kdf::{constant_time_eq, generate_salt, verification_hash, SALT_LEN};
use crate::errors::{ClamError, Result};
use crate::vault::format::write_atomic;
use crate::vault::Vault;

use super::format::{self, RegistryEntry};

/// Longest accepted vault name.
const MAX_NAME_LEN: usize = 64;

/// Handle to the metadata file and the vault directory it describes.
pub struct VaultRegistry {
    /// Path to the metadata file.
    metadata_path: PathBuf,

    /// Directory holding one file per vault.
    vault_dir: PathBuf,

    /// Entries in insertion order.
    entries: Vec<RegistryEntry>,

    /// Name of the active vault; `None` only when `entries` is empty.
    active: Option<String>,
}

impl VaultRegistry {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Load the registry, creating the metadata and vault directories if
    /// they do not exist yet.  A missing metadata file is an empty
    /// registry.
    pub fn open(metadata_path: &Path, vault_dir: &Path) -> Result<Self> {
        if let Some(parent) = metadata_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(vault_dir)?;

        let contents = if metadata_path.exists() {
            format::decode(&fs::read(metadata_path)?)?
        } else {
            format::RegistryContents::default()
        };

        debug!(
            path = %metadata_path.display(),
            vaults = contents.entries.len(),
            active = contents.active.as_deref().unwrap_or("<none>"),
            "loaded vault registry"
        );

        Ok(Self {
            metadata_path: metadata_path.to_path_buf(),
            vault_dir: vault_dir.to_path_buf(),
            entries: contents.entries,
            active: contents.active,
        })
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// `true` iff `expected_hash == sha256(sha256(passphrase) || salt)`,
    /// compared in constant time.
    pub fn validate_key(passphrase: &str, salt: &[u8; SALT_LEN], expected_hash: &[u8]) -> bool {
        let computed = verification_hash(passphrase.as_bytes(), salt);
        constant_time_eq(&computed, expected_hash)
    }

    /// Check `passphrase` against the named vault.
    pub fn authenticate(&self, name: &str, passphrase: &str) -> Result<()> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ClamError::VaultNotFound(name.to_string()))?;
        if !Self::validate_key(passphrase, &entry.salt, &entry.verification_hash) {
            debug!(vault = name, "passphrase rejected");
            return Err(ClamError::InvalidPassphrase);
        }
        Ok(())
    }

    /// Authenticate against the active vault and open it.
    pub fn open_active_vault(&self, passphrase: &str) -> Result<Vault> {
        let name = self.active_name().ok_or(ClamError::NoActiveVault)?;
        self.authenticate(name, passphrase)?;
        Vault::open(&self.vault_dir, name, passphrase)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Register a new vault and create its (empty) backing file.
    ///
    /// The first vault ever added becomes active.
    pub fn add_vault(&mut self, name: &str, passphrase: &str) -> Result<()> {
        validate_vault_name(name)?;
        if self.entry(name).is_some() {
            return Err(ClamError::DuplicateVault(name.to_string()));
        }

        let mut vault = Vault::create(&self.vault_dir, name, passphrase);
        vault.write_vault()?;

        let salt = generate_salt()?;
        self.entries.push(RegistryEntry {
            name: name.to_string(),
            verification_hash: verification_hash(passphrase.as_bytes(), &salt),
            salt,
        });
        let became_active = self.active.is_none();
        if became_active {
            self.active = Some(name.to_string());
        }

        if let Err(e) = self.write_metadata() {
            self.entries.pop();
            if became_active {
                self.active = None;
            }
            let _ = fs::remove_file(vault.path());
            return Err(e);
        }

        debug!(vault = name, active = became_active, "added vault");
        Ok(())
    }

    /// Change the active vault's passphrase.
    ///
    /// Order of operations: the re-encrypted vault is staged (written and
    /// fsynced beside the live file), the registry is rewritten with the
    /// new salt and hash, and only then is the staged vault renamed into
    /// place.  A failed registry write discards the staged file and
    /// leaves everything as it was.
    pub fn update_active_vault_key(
        &mut self,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<()> {
        let name = self
            .active_name()
            .ok_or(ClamError::NoActiveVault)?
            .to_string();
        self.authenticate(&name, old_passphrase)?;

        let mut vault = Vault::open(&self.vault_dir, &name, old_passphrase)?;
        vault.update_key(new_passphrase);
        let staged = vault.stage_write()?;

        let salt = generate_salt()?;
        let new_hash = verification_hash(new_passphrase.as_bytes(), &salt);

        let index = self
            .index_of(&name)
            .ok_or_else(|| ClamError::VaultNotFound(name.clone()))?;
        let previous = self.entries[index].clone();
        self.entries[index].salt = salt;
        self.entries[index].verification_hash = new_hash;

        if let Err(e) = self.write_metadata() {
            self.entries[index] = previous;
            return Err(e);
        }

        if let Err(e) = staged.commit() {
            // Registry now expects the new passphrase but the vault file
            // still holds the old ciphertext.
            warn!(vault = %name, error = %e, "registry updated but vault rename failed");
            return Err(e);
        }

        debug!(vault = %name, accounts = vault.account_count(), "rekeyed active vault");
        Ok(())
    }

    /// Make `target` the active vault.
    pub fn switch_active_vault(&mut self, passphrase: &str, target: &str) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ClamError::NoActiveVault);
        }
        if self.active_name() == Some(target) {
            return Err(ClamError::AlreadyActive(target.to_string()));
        }
        self.authenticate(target, passphrase)?;

        let previous = self.active.replace(target.to_string());
        if let Err(e) = self.write_metadata() {
            self.active = previous;
            return Err(e);
        }

        debug!(vault = target, "switched active vault");
        Ok(())
    }

    /// Remove a non-active vault from the registry and delete its file.
    pub fn delete_vault(&mut self, passphrase: &str, target: &str) -> Result<()> {
        if self.active_name() == Some(target) {
            return Err(ClamError::ActiveVaultDeletion(target.to_string()));
        }
        self.authenticate(target, passphrase)?;

        let index = self
            .index_of(target)
            .ok_or_else(|| ClamError::VaultNotFound(target.to_string()))?;
        let removed = self.entries.remove(index);
        if let Err(e) = self.write_metadata() {
            self.entries.insert(index, removed);
            return Err(e);
        }

        let path = self.vault_path(target);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(vault = target, "vault file was already missing");
            }
            Err(e) => return Err(e.into()),
        }

        debug!(vault = target, "deleted vault");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Vault names, active first, then the rest in registry order.
    pub fn list_vault_names(&self) -> Vec<&str> {
        let active = self.active_name();
        active
            .into_iter()
            .chain(
                self.entries
                    .iter()
                    .map(|e| e.name.as_str())
                    .filter(|n| Some(*n) != active),
            )
            .collect()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    /// Path of the backing file for a vault name.
    pub fn vault_path(&self, name: &str) -> PathBuf {
        self.vault_dir.join(name)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    fn write_metadata(&self) -> Result<()> {
        let bytes = format::encode(&self.entries, self.active_name())?;
        write_atomic(&self.metadata_path, &bytes)?;
        debug!(
            path = %self.metadata_path.display(),
            vaults = self.entries.len(),
            "wrote vault registry"
        );
        Ok(())
    }
}

/// Validate that a vault name is safe to use as a file name.
///
/// Allowed: ASCII letters, digits, `-`, `_`, `.`.  Must be non-empty, at
/// most 64 characters, and must not start with `.`.
pub fn validate_vault_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ClamError::InvalidVaultName(
            "vault name cannot be empty".into(),
        ));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ClamError::InvalidVaultName(format!(
            "vault name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
    {
        return Err(ClamError::InvalidVaultName(format!(
            "'{name}' may only contain ASCII letters, digits, '-', '_', and '.'"
        )));
    }

    if name.starts_with('.') {
        return Err(ClamError::InvalidVaultName(format!(
            "'{name}' cannot start with '.'"
        )));
    }

    Ok(())
}
