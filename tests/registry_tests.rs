//! Integration tests for the Clam vault registry.

use std::fs;
use std::path::{Path, PathBuf};

use clam::errors::ClamError;
use clam::registry::format::encode;
use clam::registry::{RegistryEntry, VaultRegistry};
use clam::vault::Account;
use tempfile::TempDir;

/// Helper: a temp data dir plus the metadata path and vault dir inside it.
fn layout() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let meta = dir.path().join("meta").join("meta");
    let vaults = dir.path().join("vaults");
    (dir, meta, vaults)
}

fn open(meta: &Path, vaults: &Path) -> VaultRegistry {
    VaultRegistry::open(meta, vaults).expect("open registry")
}

// ---------------------------------------------------------------------------
// Adding vaults
// ---------------------------------------------------------------------------

#[test]
fn open_creates_directories_and_starts_empty() {
    let (_dir, meta, vaults) = layout();
    let registry = open(&meta, &vaults);

    assert!(registry.is_empty());
    assert!(registry.active_name().is_none());
    assert!(meta.parent().unwrap().is_dir());
    assert!(vaults.is_dir());
}

#[test]
fn first_vault_becomes_active_and_second_does_not() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);

    registry.add_vault("work", "abc123").unwrap();
    registry.add_vault("personal", "xyz").unwrap();

    assert_eq!(registry.active_name(), Some("work"));
    assert_eq!(registry.list_vault_names(), ["work", "personal"]);

    // Survives a reload.
    let reloaded = open(&meta, &vaults);
    assert_eq!(reloaded.active_name(), Some("work"));
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn duplicate_vault_name_is_rejected() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();

    assert!(matches!(
        registry.add_vault("work", "other"),
        Err(ClamError::DuplicateVault(_))
    ));
    assert_eq!(registry.len(), 1);
}

#[test]
fn invalid_vault_name_is_rejected() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);

    assert!(matches!(
        registry.add_vault("../escape", "pw"),
        Err(ClamError::InvalidVaultName(_))
    ));
    assert!(registry.is_empty());
}

#[test]
fn new_vault_file_is_empty() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("temp", "pw").unwrap();

    assert_eq!(fs::metadata(vaults.join("temp")).unwrap().len(), 0);
    let vault = registry.open_active_vault("pw").unwrap();
    assert_eq!(vault.account_count(), 0);
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[test]
fn add_account_then_reopen_with_right_and_wrong_key() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();

    let mut vault = registry.open_active_vault("abc123").unwrap();
    vault
        .add_account(Account::with_credentials("github", "alice", "s3cret"))
        .unwrap();
    vault.write_vault().unwrap();
    drop(vault);

    let registry = open(&meta, &vaults);
    let vault = registry.open_active_vault("abc123").unwrap();
    let github = vault.get_account("github").unwrap();
    assert_eq!(github.username(), "alice");
    assert_eq!(github.password(), "s3cret");

    let entry = registry.entry("work").unwrap();
    assert!(!VaultRegistry::validate_key(
        "wrong",
        &entry.salt,
        &entry.verification_hash
    ));
    assert!(matches!(
        registry.open_active_vault("wrong"),
        Err(ClamError::InvalidPassphrase)
    ));
}

#[test]
fn salts_differ_between_vaults_with_same_key() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("a", "same").unwrap();
    registry.add_vault("b", "same").unwrap();

    let a = registry.entry("a").unwrap();
    let b = registry.entry("b").unwrap();
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.verification_hash, b.verification_hash);
}

#[test]
fn open_active_vault_without_vaults_fails() {
    let (_dir, meta, vaults) = layout();
    let registry = open(&meta, &vaults);
    assert!(matches!(
        registry.open_active_vault("pw"),
        Err(ClamError::NoActiveVault)
    ));
}

// ---------------------------------------------------------------------------
// Switching
// ---------------------------------------------------------------------------

#[test]
fn switch_changes_active_and_persists() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();
    registry.add_vault("personal", "xyz").unwrap();

    registry.switch_active_vault("xyz", "personal").unwrap();
    assert_eq!(registry.active_name(), Some("personal"));
    assert_eq!(registry.list_vault_names(), ["personal", "work"]);

    let reloaded = open(&meta, &vaults);
    assert_eq!(reloaded.active_name(), Some("personal"));
}

#[test]
fn switch_failures_leave_registry_unchanged() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();
    registry.add_vault("personal", "xyz").unwrap();

    assert!(matches!(
        registry.switch_active_vault("abc123", "work"),
        Err(ClamError::AlreadyActive(_))
    ));
    assert!(matches!(
        registry.switch_active_vault("wrong", "personal"),
        Err(ClamError::InvalidPassphrase)
    ));
    assert!(matches!(
        registry.switch_active_vault("pw", "ghost"),
        Err(ClamError::VaultNotFound(_))
    ));
    assert_eq!(registry.active_name(), Some("work"));
}

#[test]
fn switch_on_empty_registry_fails() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    assert!(matches!(
        registry.switch_active_vault("pw", "work"),
        Err(ClamError::NoActiveVault)
    ));
}

// ---------------------------------------------------------------------------
// Deleting
// ---------------------------------------------------------------------------

#[test]
fn deleting_active_vault_is_refused() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();
    let before = fs::read(&meta).unwrap();

    assert!(matches!(
        registry.delete_vault("abc123", "work"),
        Err(ClamError::ActiveVaultDeletion(_))
    ));
    assert_eq!(fs::read(&meta).unwrap(), before);
    assert!(vaults.join("work").exists());
}

#[test]
fn delete_removes_entry_and_file() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();
    registry.add_vault("old", "pw").unwrap();

    registry.delete_vault("pw", "old").unwrap();
    assert!(registry.entry("old").is_none());
    assert!(!vaults.join("old").exists());

    let reloaded = open(&meta, &vaults);
    assert_eq!(reloaded.list_vault_names(), ["work"]);
}

#[test]
fn delete_with_wrong_key_keeps_vault() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();
    registry.add_vault("old", "pw").unwrap();

    assert!(matches!(
        registry.delete_vault("nope", "old"),
        Err(ClamError::InvalidPassphrase)
    ));
    assert!(registry.entry("old").is_some());
    assert!(vaults.join("old").exists());
}

// ---------------------------------------------------------------------------
// Rekeying
// ---------------------------------------------------------------------------

#[test]
fn rekey_keeps_accounts_and_swaps_keys() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "old-key").unwrap();

    let mut vault = registry.open_active_vault("old-key").unwrap();
    vault
        .add_account(Account::with_credentials("github", "alice", "s3cret"))
        .unwrap();
    vault.write_vault().unwrap();
    drop(vault);

    let old_salt = registry.entry("work").unwrap().salt;
    registry.update_active_vault_key("old-key", "new-key").unwrap();
    assert_ne!(registry.entry("work").unwrap().salt, old_salt);

    let reloaded = open(&meta, &vaults);
    assert!(matches!(
        reloaded.authenticate("work", "old-key"),
        Err(ClamError::InvalidPassphrase)
    ));
    let vault = reloaded.open_active_vault("new-key").unwrap();
    assert_eq!(vault.get_account("github").unwrap().password(), "s3cret");
}

#[test]
fn rekey_with_wrong_key_changes_nothing() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();
    let meta_before = fs::read(&meta).unwrap();

    assert!(matches!(
        registry.update_active_vault_key("wrong", "new"),
        Err(ClamError::InvalidPassphrase)
    ));
    assert_eq!(fs::read(&meta).unwrap(), meta_before);
    assert!(registry.authenticate("work", "abc123").is_ok());
}

#[test]
fn failed_registry_write_rolls_back_rekey() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "old-key").unwrap();

    let mut vault = registry.open_active_vault("old-key").unwrap();
    vault
        .add_account(Account::with_credentials("github", "alice", "s3cret"))
        .unwrap();
    vault.write_vault().unwrap();
    drop(vault);

    // A directory where the registry's temp file goes makes the write fail.
    fs::create_dir(meta.parent().unwrap().join(".meta.tmp")).unwrap();

    assert!(registry.update_active_vault_key("old-key", "new-key").is_err());
    assert!(registry.authenticate("work", "old-key").is_ok());
    assert!(matches!(
        registry.authenticate("work", "new-key"),
        Err(ClamError::InvalidPassphrase)
    ));
    assert!(!vaults.join(".work.tmp").exists());

    let vault = registry.open_active_vault("old-key").unwrap();
    let github = vault.get_account("github").unwrap();
    assert_eq!(github.username(), "alice");
    assert_eq!(github.password(), "s3cret");
}

// ---------------------------------------------------------------------------
// Mixed operation sequences
// ---------------------------------------------------------------------------

/// Names are unique and exactly one of them is active, listed first.
fn assert_registry_consistent(registry: &VaultRegistry) {
    let names = registry.list_vault_names();
    assert_eq!(names.len(), registry.len());

    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), names.len(), "duplicate names in {names:?}");

    match registry.active_name() {
        Some(active) => {
            assert_eq!(names.first(), Some(&active));
            assert_eq!(names.iter().filter(|n| **n == active).count(), 1);
        }
        None => assert!(names.is_empty()),
    }
}

/// Check the live registry and a freshly loaded copy agree.
fn check(registry: &VaultRegistry, meta: &Path, vaults: &Path) {
    assert_registry_consistent(registry);
    let reloaded = open(meta, vaults);
    assert_registry_consistent(&reloaded);
    assert_eq!(reloaded.active_name(), registry.active_name());
    assert_eq!(reloaded.list_vault_names(), registry.list_vault_names());
}

#[test]
fn invariants_hold_across_mixed_operations() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    check(&registry, &meta, &vaults);

    registry.add_vault("work", "w").unwrap();
    check(&registry, &meta, &vaults);
    registry.add_vault("home", "h").unwrap();
    check(&registry, &meta, &vaults);
    registry.add_vault("spare", "s").unwrap();
    check(&registry, &meta, &vaults);

    assert!(registry.add_vault("home", "x").is_err());
    check(&registry, &meta, &vaults);

    registry.switch_active_vault("h", "home").unwrap();
    check(&registry, &meta, &vaults);
    assert_eq!(registry.active_name(), Some("home"));

    assert!(registry.delete_vault("h", "home").is_err());
    check(&registry, &meta, &vaults);

    registry.delete_vault("w", "work").unwrap();
    check(&registry, &meta, &vaults);

    registry.add_vault("work", "w2").unwrap();
    check(&registry, &meta, &vaults);

    registry.switch_active_vault("s", "spare").unwrap();
    check(&registry, &meta, &vaults);
    registry.delete_vault("h", "home").unwrap();
    check(&registry, &meta, &vaults);

    assert_eq!(registry.active_name(), Some("spare"));
    assert_eq!(registry.list_vault_names(), ["spare", "work"]);
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn path_like_name_in_metadata_is_rejected() {
    let (dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();

    let victim = dir.path().join("victim.txt");
    fs::write(&victim, "keep me").unwrap();

    let work = registry.entry("work").unwrap().clone();
    let escape = RegistryEntry {
        name: "../victim.txt".to_string(),
        ..work.clone()
    };
    fs::write(&meta, encode(&[work, escape], Some("work")).unwrap()).unwrap();

    assert!(matches!(
        VaultRegistry::open(&meta, &vaults),
        Err(ClamError::CorruptMetadata(_))
    ));
    assert!(victim.exists());
}

#[test]
fn truncated_metadata_fails_to_load() {
    let (_dir, meta, vaults) = layout();
    let mut registry = open(&meta, &vaults);
    registry.add_vault("work", "abc123").unwrap();

    let raw = fs::read(&meta).unwrap();
    fs::write(&meta, &raw[..raw.len() - 10]).unwrap();

    assert!(matches!(
        VaultRegistry::open(&meta, &vaults),
        Err(ClamError::CorruptMetadata(_))
    ));
}
