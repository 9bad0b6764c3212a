//! Binary registry metadata file.
//!
//! ```text
//! [numVaults: u32 LE]
//! repeat numVaults times:
//!   [len(name): u32 LE][name]
//!   [verification hash: 32 bytes]
//!   [salt: 32 bytes]
//! ```
//!
//! The first entry on disk is the active vault.  In memory the active
//! vault is tracked by name, so ordering only matters at this boundary:
//! `encode` always writes the active entry first and `decode` reads the
//! first entry back as active.

use crate::codec::{put_len_prefixed, put_u32_le, ByteCursor};
use crate::crypto::kdf::{FixedDigest, SALT_LEN};
use crate::errors::{ClamError, Result};

use super::manager::validate_vault_name;

/// Verification material for one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    /// `sha256(sha256(passphrase) || salt)`.
    pub verification_hash: FixedDigest,
    pub salt: [u8; SALT_LEN],
}

/// Decoded registry contents.
#[derive(Debug, Default)]
pub struct RegistryContents {
    pub entries: Vec<RegistryEntry>,
    pub active: Option<String>,
}

/// Serialize the registry, active entry first.
pub fn encode(entries: &[RegistryEntry], active: Option<&str>) -> Result<Vec<u8>> {
    let count = u32::try_from(entries.len())
        .map_err(|_| ClamError::CorruptMetadata("too many vaults".into()))?;

    let mut buf = Vec::new();
    put_u32_le(&mut buf, count);

    let is_active = |e: &&RegistryEntry| Some(e.name.as_str()) == active;
    let ordered = entries
        .iter()
        .filter(is_active)
        .chain(entries.iter().filter(|e| !is_active(e)));

    for entry in ordered {
        put_len_prefixed(&mut buf, entry.name.as_bytes())?;
        buf.extend_from_slice(&entry.verification_hash);
        buf.extend_from_slice(&entry.salt);
    }

    Ok(buf)
}

/// Parse registry bytes.  A zero-length file is an empty registry.
pub fn decode(data: &[u8]) -> Result<RegistryContents> {
    if data.is_empty() {
        return Ok(RegistryContents::default());
    }

    let mut cursor = ByteCursor::new(data);
    let count = cursor.read_u32_le().map_err(corrupt)?;

    let mut entries: Vec<RegistryEntry> = Vec::new();
    for _ in 0..count {
        let name_bytes = cursor.read_len_prefixed().map_err(corrupt)?;
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|_| ClamError::CorruptMetadata("vault name is not valid UTF-8".into()))?;
        // Names become file names under the vault directory.
        validate_vault_name(&name).map_err(corrupt)?;
        let verification_hash = cursor.read_array().map_err(corrupt)?;
        let salt = cursor.read_array().map_err(corrupt)?;

        if entries.iter().any(|e| e.name == name) {
            return Err(ClamError::CorruptMetadata(format!(
                "vault '{name}' is listed twice"
            )));
        }
        entries.push(RegistryEntry {
            name,
            verification_hash,
            salt,
        });
    }

    if !cursor.is_exhausted() {
        return Err(ClamError::CorruptMetadata(format!(
            "{} trailing bytes after {count} entries",
            cursor.remaining()
        )));
    }

    let active = entries.first().map(|e| e.name.clone());
    Ok(RegistryContents { entries, active })
}

fn corrupt(e: ClamError) -> ClamError {
    ClamError::CorruptMetadata(e.to_string())
}
