//! `clam vault delete`: remove a non-active vault and its file.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, Cli};
use crate::config::Settings;
use crate::errors::{ClamError, Result};

/// Execute the `vault delete` command.
pub fn execute(cli: &Cli, settings: &Settings, name: &str, force: bool) -> Result<()> {
    let mut registry = open_registry(cli, settings)?;

    // Refuse early so the user is not asked to confirm something that
    // cannot happen.
    if registry.active_name() == Some(name) {
        return Err(ClamError::ActiveVaultDeletion(name.to_string()));
    }
    if registry.entry(name).is_none() {
        return Err(ClamError::VaultNotFound(name.to_string()));
    }

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete vault '{name}' and every account in it? This cannot be undone"
            ))
            .default(false)
            .interact()
            .map_err(|e| ClamError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let key = prompt_key(cli)?;
    registry.delete_vault(&key, name)?;

    output::success(&format!("Deleted vault '{name}'"));
    Ok(())
}
