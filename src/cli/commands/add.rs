//! `clam add`: add an account to the active vault.

use std::path::Path;

use dialoguer::{Input, Password};
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, prompt_new_key, Cli};
use crate::config::Settings;
use crate::errors::{ClamError, Result};
use crate::vault::Account;

/// Execute the `add` command.
///
/// If no vault exists yet, the configured default vault is created
/// first under the supplied key.
pub fn execute(
    cli: &Cli,
    settings: &Settings,
    tag: &str,
    username: Option<&str>,
    password: Option<&str>,
    file: Option<&Path>,
) -> Result<()> {
    let mut registry = open_registry(cli, settings)?;

    let key = if registry.is_empty() {
        let key = prompt_new_key(cli)?;
        registry.add_vault(&settings.default_vault_name, &key)?;
        output::info(&format!(
            "Created vault '{}' for your first account.",
            settings.default_vault_name
        ));
        key
    } else {
        prompt_key(cli)?
    };

    let mut vault = registry.open_active_vault(&key)?;
    if vault.exists(tag) {
        return Err(ClamError::AccountExists(tag.to_string()));
    }

    let account = match (file, username, password) {
        (Some(path), _, _) => Account::from_import_file(tag, path)?,
        (None, Some(u), Some(p)) => Account::with_credentials(tag, u, p),
        _ => prompt_account(tag)?,
    };

    vault.add_account(account)?;
    vault.write_vault()?;

    output::success(&format!("Added '{tag}' to vault '{}'", vault.name()));
    Ok(())
}

/// Ask for username and password interactively.
fn prompt_account(tag: &str) -> Result<Account> {
    let username: String = Input::new()
        .with_prompt(format!("Username for '{tag}'"))
        .interact_text()
        .map_err(|e| ClamError::CommandFailed(format!("username prompt: {e}")))?;

    let password = Zeroizing::new(
        Password::new()
            .with_prompt(format!("Password for '{tag}'"))
            .with_confirmation("Confirm password", "Passwords do not match, try again")
            .interact()
            .map_err(|e| ClamError::CommandFailed(format!("password prompt: {e}")))?,
    );

    Ok(Account::with_credentials(tag, &username, &password))
}
