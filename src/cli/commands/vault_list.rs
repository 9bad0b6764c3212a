//! `clam vault list`: list vault names, or the active vault's accounts.

use std::io::{self, Write};

use crate::cli::output;
use crate::cli::{open_registry, prompt_key, Cli};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `vault list` command.
///
/// Listing names needs no key.  `--accounts` opens the active vault and
/// prints its tags; `--info` adds usernames and notes.
pub fn execute(cli: &Cli, settings: &Settings, accounts: bool, info: bool) -> Result<()> {
    let registry = open_registry(cli, settings)?;

    if !accounts {
        output::print_vault_names(&registry.list_vault_names(), registry.active_name());
        return Ok(());
    }

    let key = prompt_key(cli)?;
    let vault = registry.open_active_vault(&key)?;

    if vault.account_count() == 0 {
        output::info(&format!("Vault '{}' has no accounts yet.", vault.name()));
        output::tip("Run `clam add <TAG>` to add one.");
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if info {
        vault.print_info(&mut out)?;
    } else {
        vault.print_tags(&mut out)?;
    }
    out.flush()?;

    Ok(())
}
