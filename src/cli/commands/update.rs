//! `clam update`: change or delete one account in the active vault.

use std::path::PathBuf;

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, Cli};
use crate::config::Settings;
use crate::errors::{ClamError, Result};
use crate::vault::Account;

/// The single change requested on the command line.
#[derive(Debug)]
pub enum Change {
    Username(String),
    Password(String),
    Note(String),
    File(PathBuf),
    Delete,
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, settings: &Settings, tag: &str, change: Change) -> Result<()> {
    let registry = open_registry(cli, settings)?;
    let key = prompt_key(cli)?;
    let mut vault = registry.open_active_vault(&key)?;

    let not_found = || ClamError::AccountNotFound(tag.to_string());

    let done = match change {
        Change::Username(value) => {
            vault.account_mut(tag).ok_or_else(not_found)?.set_username(&value);
            "Updated username for"
        }
        Change::Password(value) => {
            vault.account_mut(tag).ok_or_else(not_found)?.set_password(&value);
            "Updated password for"
        }
        Change::Note(value) => {
            vault.account_mut(tag).ok_or_else(not_found)?.set_note(&value);
            "Updated note for"
        }
        Change::File(path) => {
            if !vault.exists(tag) {
                return Err(not_found());
            }
            vault.replace_account(Account::from_import_file(tag, &path)?)?;
            "Replaced"
        }
        Change::Delete => {
            vault.remove_account(tag)?;
            "Deleted"
        }
    };

    vault.write_vault()?;

    output::success(&format!("{done} '{tag}'"));
    Ok(())
}
