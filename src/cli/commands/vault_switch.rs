//! `clam vault switch`: make another vault active.

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, Cli};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `vault switch` command.  The key is the target vault's.
pub fn execute(cli: &Cli, settings: &Settings, name: &str) -> Result<()> {
    let mut registry = open_registry(cli, settings)?;
    let key = prompt_key(cli)?;

    registry.switch_active_vault(&key, name)?;

    output::success(&format!("Switched to vault '{name}'"));
    Ok(())
}
