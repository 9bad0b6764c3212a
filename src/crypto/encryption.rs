//! AES-256-CTR stream encryption.
//!
//! Counter mode is length preserving: no padding, no block alignment, and
//! encryption and decryption are the same keystream XOR.  Every call to
//! `encrypt` must use a fresh nonce from `generate_nonce`.
//!
//! Nonces are 32 bytes so they line up with the on-disk vault header.
//! The first 16 bytes form the initial AES counter block; the remainder
//! is stored but does not feed the cipher.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};

use super::kdf::fill_random;
use crate::errors::{ClamError, Result};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Size of the stored nonce in bytes.
pub const NONCE_LEN: usize = 32;

/// Size of the AES counter block taken from the nonce.
const IV_LEN: usize = 16;

/// A per-encryption random nonce.
pub type Nonce = [u8; NONCE_LEN];

/// Generate a fresh random nonce.
pub fn generate_nonce() -> Result<Nonce> {
    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;
    Ok(nonce)
}

/// Encrypt `plaintext` under a 32-byte `key` and `nonce`.
///
/// The returned ciphertext has exactly the plaintext's length.
pub fn encrypt(key: &[u8], nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut buf = plaintext.to_vec();
    apply_keystream(key, nonce, &mut buf)?;
    Ok(buf)
}

/// Decrypt `ciphertext` produced by `encrypt` with the same key and nonce.
///
/// A wrong key does not fail here; it yields garbage of the same length.
pub fn decrypt(key: &[u8], nonce: &Nonce, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut buf = ciphertext.to_vec();
    apply_keystream(key, nonce, &mut buf)?;
    Ok(buf)
}

/// XOR the AES-256-CTR keystream into `buf` in place.
pub fn apply_keystream(key: &[u8], nonce: &Nonce, buf: &mut [u8]) -> Result<()> {
    let mut cipher = Aes256Ctr::new_from_slices(key, &nonce[..IV_LEN])
        .map_err(|e| ClamError::EncryptionFailed(format!("invalid key length: {e}")))?;
    cipher
        .try_apply_keystream(buf)
        .map_err(|e| ClamError::EncryptionFailed(format!("keystream error: {e}")))
}
