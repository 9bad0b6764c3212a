//! Hashing, randomness, and passphrase verification material.
//!
//! Two values are derived from a passphrase and must never be confused:
//!
//! - the **encryption key** `sha256(passphrase)`, used only in memory to
//!   drive the stream cipher (see `keys::derive_encryption_key`);
//! - the **verification hash** `sha256(sha256(passphrase) || salt)`, the
//!   only passphrase-derived value ever written to disk.

use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{ClamError, Result};

/// Output length of `digest` in bytes (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Length of a verification salt in bytes.
pub const SALT_LEN: usize = 32;

/// Fixed-size output of `digest`.
pub type FixedDigest = [u8; DIGEST_LEN];

/// SHA-256 of `data`.
pub fn digest(data: &[u8]) -> FixedDigest {
    Sha256::digest(data).into()
}

/// Fill a fresh buffer of `len` bytes from the operating system CSPRNG.
pub fn secure_random_bytes(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Fill `buf` in place from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| ClamError::RandomFailed(e.to_string()))
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}

/// Compute `sha256(sha256(passphrase) || salt)`.
///
/// The inner digest is the vault's encryption key, so the intermediate
/// buffers are wiped before returning.
pub fn verification_hash(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> FixedDigest {
    let mut inner = digest(passphrase);

    let mut hasher = Sha256::new();
    hasher.update(&inner);
    hasher.update(salt);
    let outer: FixedDigest = hasher.finalize().into();

    inner.zeroize();
    outer
}

/// Compare two byte strings without an early exit on the first mismatch.
///
/// Lengths are not secret; slices of different length compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
