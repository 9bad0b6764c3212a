//! `clam vault update`: change the active vault's key.
//!
//! Every record is re-encrypted under the new key and the registry's
//! salt and verification hash are replaced.

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, prompt_replacement_key, Cli};
use crate::config::Settings;
use crate::errors::{ClamError, Result};

/// Execute the `vault update` command.
pub fn execute(cli: &Cli, settings: &Settings, new_key: Option<&str>) -> Result<()> {
    let mut registry = open_registry(cli, settings)?;
    let name = registry
        .active_name()
        .ok_or(ClamError::NoActiveVault)?
        .to_string();

    let old_key = prompt_key(cli)?;
    // Fail on a wrong key before asking for a new one.
    registry.authenticate(&name, &old_key)?;

    let new_key = prompt_replacement_key(new_key)?;
    registry.update_active_vault_key(&old_key, &new_key)?;

    output::success(&format!("Updated key for vault '{name}'"));
    Ok(())
}
