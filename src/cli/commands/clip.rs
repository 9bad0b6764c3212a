//! `clam clip`: copy a username or password to the system clipboard.

use arboard::Clipboard;

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, Cli};
use crate::config::Settings;
use crate::errors::{ClamError, Result};

/// Execute the `clip` command.  `password == false` copies the username.
pub fn execute(cli: &Cli, settings: &Settings, tag: &str, password: bool) -> Result<()> {
    let registry = open_registry(cli, settings)?;
    let key = prompt_key(cli)?;
    let vault = registry.open_active_vault(&key)?;

    let account = vault
        .get_account(tag)
        .ok_or_else(|| ClamError::AccountNotFound(tag.to_string()))?;
    let (what, value) = if password {
        ("password", account.password())
    } else {
        ("username", account.username())
    };

    let mut clipboard =
        Clipboard::new().map_err(|e| ClamError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(value)
        .map_err(|e| ClamError::ClipboardError(e.to_string()))?;

    output::success(&format!("Copied {what} for '{tag}' to the clipboard"));
    Ok(())
}
