//! `clam vault add`: register a new, empty vault.

use crate::cli::output;
use crate::cli::{open_registry, prompt_new_key, Cli};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `vault add` command.
pub fn execute(cli: &Cli, settings: &Settings, name: &str) -> Result<()> {
    let mut registry = open_registry(cli, settings)?;
    let key = prompt_new_key(cli)?;

    registry.add_vault(name, &key)?;

    output::success(&format!("Created vault '{name}'"));
    if registry.active_name() == Some(name) {
        output::info(&format!("'{name}' is now the active vault."));
    } else {
        output::tip(&format!("Run `clam vault switch {name}` to start using it."));
    }

    Ok(())
}
