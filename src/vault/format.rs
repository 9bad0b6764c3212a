//! On-disk vault envelope and atomic file writes.
//!
//! A vault file has this layout:
//!
//! ```text
//! [nonce: 32 bytes][ciphertext: remaining bytes]
//! ```
//!
//! - **Nonce**: fresh random value, regenerated on every write.
//! - **Ciphertext**: AES-256-CTR of the serialized record stream under
//!   `sha256(passphrase)`; exactly as long as the plaintext.
//!
//! An empty vault is a zero-length file with no nonce at all.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::crypto::encryption::{Nonce, NONCE_LEN};
use crate::errors::{ClamError, Result};

/// Parsed contents of a vault file.
pub enum VaultEnvelope {
    /// Zero-length file: no records.
    Empty,
    /// Nonce plus ciphertext.
    Sealed { nonce: Nonce, ciphertext: Vec<u8> },
}

/// Split raw file bytes into an envelope.
///
/// A non-empty file shorter than a nonce cannot have been written by us.
pub fn parse_envelope(name: &str, data: &[u8]) -> Result<VaultEnvelope> {
    if data.is_empty() {
        return Ok(VaultEnvelope::Empty);
    }
    if data.len() < NONCE_LEN {
        return Err(ClamError::CorruptVault(format!(
            "{name}: file is {} bytes, shorter than the {NONCE_LEN}-byte nonce",
            data.len()
        )));
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);
    Ok(VaultEnvelope::Sealed {
        nonce,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Build the bytes of a sealed vault file.
pub fn seal_envelope(nonce: &Nonce, ciphertext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(ciphertext);
    buf
}

/// A file written to a temp path and flushed to disk, waiting to be
/// renamed over its target.
///
/// Dropping an uncommitted write removes the temp file.
#[derive(Debug)]
pub struct StagedWrite {
    tmp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    /// Atomically rename the staged file over the target.
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp_path, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// Write `bytes` to a hidden temp file next to `path` and fsync it.
///
/// The temp file is in the same directory so the later rename stays on
/// one filesystem.
pub fn stage_write(path: &Path, bytes: &[u8]) -> Result<StagedWrite> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let staged = StagedWrite {
        tmp_path,
        target: path.to_path_buf(),
        committed: false,
    };

    let mut file = create_private(&staged.tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;

    Ok(staged)
}

/// Write `bytes` to `path` atomically: stage, fsync, rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    stage_write(path, bytes)?.commit()
}

/// Create (truncating) a file readable only by its owner on Unix.
fn create_private(path: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    Ok(options.open(path)?)
}
