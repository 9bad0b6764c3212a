//! `clam print`: print one account's details to stdout.

use crate::cli::{open_registry, prompt_key, Cli};
use crate::config::Settings;
use crate::errors::{ClamError, Result};

/// Which part of the account to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    All,
    Username,
    Password,
    Note,
}

/// Execute the `print` command.
pub fn execute(cli: &Cli, settings: &Settings, tag: &str, field: Field) -> Result<()> {
    let registry = open_registry(cli, settings)?;
    let key = prompt_key(cli)?;
    let vault = registry.open_active_vault(&key)?;

    let account = vault
        .get_account(tag)
        .ok_or_else(|| ClamError::AccountNotFound(tag.to_string()))?;

    match field {
        Field::All => {
            println!("un={}", account.username());
            println!("pw={}", account.password());
            println!("note={}", account.note());
        }
        Field::Username => println!("{}", account.username()),
        Field::Password => println!("{}", account.password()),
        Field::Note => println!("{}", account.note()),
    }

    Ok(())
}
