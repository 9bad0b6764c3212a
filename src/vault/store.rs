//! High-level vault operations.
//!
//! `Vault` owns the decrypted records of one vault file for the length of
//! a session.  It trusts the passphrase it is handed: a wrong passphrase
//! is caught by the registry's verification hash before a vault is ever
//! opened, never here.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use comfy_table::{ContentArrangement, Table};
use tracing::debug;
use zeroize::Zeroizing;

use crate::codec::ByteCursor;
use crate::crypto::encryption::{apply_keystream, generate_nonce};
use crate::crypto::keys::derive_encryption_key;
use crate::errors::{ClamError, Result};

use super::account::Account;
use super::format::{self, StagedWrite, VaultEnvelope};

/// Where the in-memory records stand relative to the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    /// Newly created, no records, never written.
    Empty,
    /// Records changed since the last write (or loaded and not yet written).
    Loaded,
    /// In-memory records match the file on disk.
    Persisted,
}

/// One decrypted vault.  Records and passphrase are wiped on drop.
pub struct Vault {
    /// Vault name; also the backing file's name.
    name: String,

    /// Path to the backing file.
    path: PathBuf,

    /// Passphrase used for the next write.
    passphrase: Zeroizing<String>,

    /// Records in insertion order.
    accounts: Vec<Account>,

    state: VaultState,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Start a brand-new vault with no records.  Nothing is read or written.
    pub fn create(vault_dir: &Path, name: &str, passphrase: &str) -> Self {
        debug!(vault = name, "creating empty vault");
        Self {
            name: name.to_string(),
            path: vault_dir.join(name),
            passphrase: Zeroizing::new(passphrase.to_string()),
            accounts: Vec::new(),
            state: VaultState::Empty,
        }
    }

    /// Read and decrypt an existing vault file.
    ///
    /// A zero-length file is an empty vault.  A trailing partial record
    /// after decryption is `CorruptVault`.  The key and plaintext are
    /// wiped before returning, on success and on error.
    pub fn open(vault_dir: &Path, name: &str, passphrase: &str) -> Result<Self> {
        let path = vault_dir.join(name);
        if !path.exists() {
            return Err(ClamError::VaultNotFound(name.to_string()));
        }

        let data = fs::read(&path)?;
        let mut vault = Self {
            name: name.to_string(),
            path,
            passphrase: Zeroizing::new(passphrase.to_string()),
            accounts: Vec::new(),
            state: VaultState::Persisted,
        };

        match format::parse_envelope(name, &data)? {
            VaultEnvelope::Empty => {
                debug!(vault = name, "opened empty vault file");
            }
            VaultEnvelope::Sealed { nonce, ciphertext } => {
                let key = derive_encryption_key(vault.passphrase.as_bytes());
                let mut plaintext = Zeroizing::new(ciphertext);
                apply_keystream(key.as_bytes(), &nonce, &mut plaintext)?;
                drop(key);

                vault.accounts = parse_records(name, &plaintext)?;
                debug!(
                    vault = name,
                    accounts = vault.accounts.len(),
                    bytes = plaintext.len(),
                    "decrypted vault"
                );
            }
        }

        Ok(vault)
    }

    // ------------------------------------------------------------------
    // Account operations
    // ------------------------------------------------------------------

    /// Look up an account by tag.  `None` if absent.
    pub fn get_account(&self, tag: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.tag() == tag)
    }

    /// Mutable access to an account; marks the vault dirty.
    pub fn account_mut(&mut self, tag: &str) -> Option<&mut Account> {
        let account = self.accounts.iter_mut().find(|a| a.tag() == tag)?;
        self.state = VaultState::Loaded;
        Some(account)
    }

    /// `true` if an account with this tag exists.
    pub fn exists(&self, tag: &str) -> bool {
        self.get_account(tag).is_some()
    }

    /// Append an account.  Fails with `InvalidTag` if the tag is empty or
    /// `AccountExists` if it is taken; either way the vault is unchanged.
    pub fn add_account(&mut self, account: Account) -> Result<()> {
        if account.tag().is_empty() {
            return Err(ClamError::InvalidTag("account tag cannot be empty".into()));
        }
        if self.exists(account.tag()) {
            return Err(ClamError::AccountExists(account.tag().to_string()));
        }
        debug!(vault = %self.name, tag = account.tag(), "adding account");
        self.accounts.push(account);
        self.state = VaultState::Loaded;
        Ok(())
    }

    /// Remove the account with this tag.  The removed record is wiped.
    pub fn remove_account(&mut self, tag: &str) -> Result<()> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.tag() == tag)
            .ok_or_else(|| ClamError::AccountNotFound(tag.to_string()))?;
        debug!(vault = %self.name, tag, "removing account");
        self.accounts.remove(index);
        self.state = VaultState::Loaded;
        Ok(())
    }

    /// Replace an existing account's details with `account`, keeping its
    /// position.  Fails with `AccountNotFound` if the tag is absent.
    pub fn replace_account(&mut self, account: Account) -> Result<()> {
        let slot = self
            .accounts
            .iter_mut()
            .find(|a| a.tag() == account.tag())
            .ok_or_else(|| ClamError::AccountNotFound(account.tag().to_string()))?;
        *slot = account;
        self.state = VaultState::Loaded;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt all records and atomically rewrite the backing file.
    ///
    /// With zero records the file is written empty: an empty vault has no
    /// nonce and no ciphertext.
    pub fn write_vault(&mut self) -> Result<()> {
        self.stage_write()?.commit()?;
        self.state = VaultState::Persisted;
        Ok(())
    }

    /// Encrypt all records into a staged temp file without replacing the
    /// backing file yet.
    ///
    /// Used when the rename must wait for another write (the registry)
    /// to land first.  The caller commits the returned write.
    pub fn stage_write(&self) -> Result<StagedWrite> {
        if self.accounts.is_empty() {
            debug!(vault = %self.name, "staging empty vault file");
            return format::stage_write(&self.path, &[]);
        }

        let mut buf = Zeroizing::new(Vec::with_capacity(
            self.accounts.iter().map(Account::encoded_len).sum(),
        ));
        for account in &self.accounts {
            account.serialize_into(&mut buf)?;
        }

        let nonce = generate_nonce()?;
        let key = derive_encryption_key(self.passphrase.as_bytes());
        apply_keystream(key.as_bytes(), &nonce, &mut buf)?;
        drop(key);

        debug!(
            vault = %self.name,
            accounts = self.accounts.len(),
            bytes = buf.len(),
            "staging encrypted vault"
        );
        format::stage_write(&self.path, &format::seal_envelope(&nonce, &buf))
    }

    /// Replace the passphrase used by the next write.
    ///
    /// Touches neither the disk nor the registry: callers must write the
    /// vault and update the registry's verification material themselves.
    pub fn update_key(&mut self, new_passphrase: &str) {
        self.passphrase = Zeroizing::new(new_passphrase.to_string());
        self.state = VaultState::Loaded;
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Write every tag, one per line, in collection order.
    pub fn print_tags<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for account in &self.accounts {
            writeln!(out, "{}", account.tag())?;
        }
        Ok(())
    }

    /// Write a table of tag, username, and note.  Passwords are omitted.
    pub fn print_info<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Tag", "Username", "Note"]);

        for account in &self.accounts {
            table.add_row(vec![account.tag(), account.username(), account.note()]);
        }

        writeln!(out, "{table}")
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    /// `true` if there are changes not yet written.
    pub fn is_dirty(&self) -> bool {
        self.state == VaultState::Loaded
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        // The passphrase wipes itself; records are wiped explicitly so the
        // intent is visible even though `Account` also zeroizes on drop.
        for account in &mut self.accounts {
            account.wipe_sensitive_data();
        }
    }
}

/// Decode a decrypted record stream.  Any leftover bytes that do not form
/// a whole record make the vault corrupt.
fn parse_records(name: &str, plaintext: &[u8]) -> Result<Vec<Account>> {
    let mut cursor = ByteCursor::new(plaintext);
    let mut accounts = Vec::new();

    while !cursor.is_exhausted() {
        let offset = cursor.position();
        let account = Account::deserialize(&mut cursor).map_err(|e| {
            ClamError::CorruptVault(format!("{name}: bad record at offset {offset}: {e}"))
        })?;
        accounts.push(account);
    }

    Ok(accounts)
}
