use thiserror::Error;

/// All errors that can occur in Clam.
#[derive(Debug, Error)]
pub enum ClamError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RandomFailed(String),

    /// A wrong passphrase and a damaged salt/hash pair are
    /// indistinguishable here.
    #[error("The provided vault key is incorrect")]
    InvalidPassphrase,

    // --- Registry errors ---
    #[error("A vault named '{0}' already exists")]
    DuplicateVault(String),

    #[error("No vault named '{0}' exists")]
    VaultNotFound(String),

    #[error("'{0}' is already the active vault")]
    AlreadyActive(String),

    #[error("Cannot delete '{0}' while it is the active vault — switch to another vault first")]
    ActiveVaultDeletion(String),

    #[error("No vaults exist yet — create one with `clam vault add <name>`")]
    NoActiveVault,

    #[error("Invalid vault name: {0}")]
    InvalidVaultName(String),

    #[error("Vault metadata is corrupt: {0}")]
    CorruptMetadata(String),

    // --- Vault errors ---
    #[error("Vault '{0}' is corrupt — refusing to use partially decrypted data")]
    CorruptVault(String),

    #[error("An account tagged '{0}' already exists")]
    AccountExists(String),

    #[error("No account tagged '{0}' exists")]
    AccountNotFound(String),

    #[error("Invalid account tag: {0}")]
    InvalidTag(String),

    // --- Record errors ---
    #[error("Record truncated: needed {needed} bytes, {remaining} remaining")]
    TruncatedRecord { needed: usize, remaining: usize },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Import file error: {0}")]
    ImportFormat(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),
}

/// Convenience type alias for Clam results.
pub type Result<T> = std::result::Result<T, ClamError>;
