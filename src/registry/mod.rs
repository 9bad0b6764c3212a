//! Registry module: the metadata store that tracks every vault.
//!
//! This module provides:
//! - The binary metadata file codec and `RegistryEntry` (`format`)
//! - `VaultRegistry`, for adding, rekeying, switching, and deleting
//!   vaults (`manager`)

pub mod format;
pub mod manager;

pub use format::RegistryEntry;
pub use manager::{validate_vault_name, VaultRegistry};
