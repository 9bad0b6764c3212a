//! Cryptographic primitives for Clam.
//!
//! This module provides:
//! - AES-256-CTR stream encryption and nonce generation (`encryption`)
//! - SHA-256 digests, salts, verification hashes, and constant-time
//!   comparison (`kdf`)
//! - A zeroize-on-drop encryption key and secure wiping (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, digest, ...};
pub use encryption::{decrypt, encrypt, generate_nonce, Nonce, NONCE_LEN};
pub use kdf::{
    constant_time_eq, digest, generate_salt, secure_random_bytes, verification_hash, FixedDigest,
    DIGEST_LEN, SALT_LEN,
};
pub use keys::{derive_encryption_key, secure_wipe, EncryptionKey};
