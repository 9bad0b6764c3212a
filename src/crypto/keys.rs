//! In-memory key handling.
//!
//! The vault encryption key is `sha256(passphrase)`.  It only ever lives
//! inside an `EncryptionKey`, which wipes itself when dropped, so every
//! exit path (including `?` returns) clears it.

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::kdf::{digest, DIGEST_LEN};

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; DIGEST_LEN],
}

impl EncryptionKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to key the stream cipher).
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }
}

/// Derive the vault encryption key from a passphrase.
pub fn derive_encryption_key(passphrase: &[u8]) -> EncryptionKey {
    let mut raw = digest(passphrase);
    let key = EncryptionKey::new(raw);
    raw.zeroize();
    key
}

/// Overwrite a buffer that held secret material with zeros.
///
/// For `String` and `Vec<u8>` the whole allocation is cleared and the
/// length reset to zero.
pub fn secure_wipe<Z: Zeroize + ?Sized>(buffer: &mut Z) {
    buffer.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_key_is_plain_digest() {
        let key = derive_encryption_key(b"abc123");
        assert_eq!(key.as_bytes(), &digest(b"abc123"));
    }

    #[test]
    fn wipe_clears_string_and_vec() {
        let mut s = String::from("hunter2");
        secure_wipe(&mut s);
        assert!(s.is_empty());

        let mut v = vec![1u8, 2, 3];
        secure_wipe(&mut v);
        assert!(v.is_empty());

        let mut arr = [9u8; 4];
        secure_wipe(&mut arr);
        assert_eq!(arr, [0u8; 4]);
    }

    #[test]
    fn explicit_zeroize_clears_key() {
        let mut key = EncryptionKey::new([0xAA; DIGEST_LEN]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; DIGEST_LEN]);
    }
}
