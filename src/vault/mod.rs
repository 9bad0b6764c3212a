//! Vault module: encrypted account storage.
//!
//! This module provides:
//! - The `Account` record and its binary encoding (`account`)
//! - The nonce + ciphertext file envelope and atomic writes (`format`)
//! - `Vault`, for opening, editing, and persisting one vault (`store`)

pub mod account;
pub mod format;
pub mod store;

// Re-export the most commonly used items.
pub use account::Account;
pub use format::StagedWrite;
pub use store::{Vault, VaultState};
