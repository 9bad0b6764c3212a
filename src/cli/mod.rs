//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use zeroize::Zeroizing;

use crate::config::{resolve_data_dir, Settings};
use crate::errors::{ClamError, Result};
use crate::registry::VaultRegistry;

/// Environment variable consulted for the vault key before prompting.
const KEY_ENV: &str = "CLAM_KEY";

/// Environment variable consulted for a replacement key during rekey.
const NEW_KEY_ENV: &str = "CLAM_NEW_KEY";

/// Clam: local encrypted password manager.
#[derive(Parser)]
#[command(name = "clam", about = "Local encrypted password manager", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the registry and vaults (default: ~/.clam)
    #[arg(long, env = "CLAM_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Vault key (falls back to $CLAM_KEY, then an interactive prompt)
    #[arg(short = 'k', long, global = true)]
    pub key: Option<String>,

    /// Print debug logs to stderr
    #[arg(long, global = true)]
    pub debug: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Manage vaults (add, update, switch, delete, list)
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },

    /// Add an account to the active vault
    #[command(group(ArgGroup::new("source").args(["username", "file"])))]
    Add {
        /// Account tag (e.g. github)
        tag: String,
        /// Account username
        #[arg(long, requires = "password")]
        username: Option<String>,
        /// Account password
        #[arg(long, requires = "username")]
        password: Option<String>,
        /// Read username, password, and note from an unencrypted file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print an account's details
    #[command(group(ArgGroup::new("field").args(["username", "password", "note"])))]
    Print {
        /// Account tag
        tag: String,
        /// Print only the username
        #[arg(long)]
        username: bool,
        /// Print only the password
        #[arg(long)]
        password: bool,
        /// Print only the note
        #[arg(long)]
        note: bool,
    },

    /// Copy an account's username or password to the clipboard
    #[command(group(ArgGroup::new("field").args(["username", "password"]).required(true)))]
    Clip {
        /// Account tag
        tag: String,
        /// Copy the username
        #[arg(long)]
        username: bool,
        /// Copy the password
        #[arg(long)]
        password: bool,
    },

    /// Update or delete an account in the active vault
    #[command(group(
        ArgGroup::new("change")
            .args(["username", "password", "note", "file", "delete"])
            .required(true)
    ))]
    Update {
        /// Account tag
        tag: String,
        /// New username
        #[arg(long)]
        username: Option<String>,
        /// New password
        #[arg(long)]
        password: Option<String>,
        /// New note
        #[arg(long)]
        note: Option<String>,
        /// Replace all details from an unencrypted file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Delete the account
        #[arg(short, long)]
        delete: bool,
    },
}

/// Vault subcommands.
#[derive(clap::Subcommand)]
pub enum VaultAction {
    /// Create a new vault (the first one becomes active)
    Add {
        /// Vault name
        name: String,
    },

    /// Change the active vault's key
    Update {
        /// New vault key (falls back to $CLAM_NEW_KEY, then a prompt)
        #[arg(long)]
        new_key: Option<String>,
    },

    /// Make another vault active
    Switch {
        /// Vault name
        name: String,
    },

    /// Delete a vault (it cannot be the active one)
    Delete {
        /// Vault name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List vault names, or the active vault's accounts
    List {
        /// List account tags in the active vault (requires the key)
        #[arg(short, long)]
        accounts: bool,
        /// Show username and note for each account
        #[arg(short, long, requires = "accounts")]
        info: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the data directory from `--data-dir` / `$CLAM_DIR` / `$HOME`.
pub fn data_dir(cli: &Cli) -> PathBuf {
    resolve_data_dir(cli.data_dir.as_deref())
}

/// Load the registry described by `settings` under the data directory.
pub fn open_registry(cli: &Cli, settings: &Settings) -> Result<VaultRegistry> {
    let dir = data_dir(cli);
    VaultRegistry::open(&settings.metadata_path(&dir), &settings.vault_dir(&dir))
}

/// Get the vault key, trying in order:
/// 1. `--key`
/// 2. `CLAM_KEY` env var
/// 3. Interactive prompt
///
/// Returns `Zeroizing<String>` so the key is wiped from memory on drop.
pub fn prompt_key(cli: &Cli) -> Result<Zeroizing<String>> {
    if let Some(key) = explicit_key(cli.key.as_deref(), KEY_ENV)? {
        return Ok(key);
    }

    let key = dialoguer::Password::new()
        .with_prompt("Enter vault key")
        .interact()
        .map_err(|e| ClamError::CommandFailed(format!("key prompt: {e}")))?;
    Ok(Zeroizing::new(key))
}

/// Get the key for a vault being created: `--key`, then `CLAM_KEY`, then
/// a prompt with confirmation.
pub fn prompt_new_key(cli: &Cli) -> Result<Zeroizing<String>> {
    new_key_from(cli.key.as_deref(), KEY_ENV, "Choose vault key")
}

/// Get the replacement key for a rekey: `--new-key`, then `CLAM_NEW_KEY`,
/// then a prompt with confirmation.
pub fn prompt_replacement_key(new_key: Option<&str>) -> Result<Zeroizing<String>> {
    new_key_from(new_key, NEW_KEY_ENV, "Choose new vault key")
}

fn new_key_from(explicit: Option<&str>, env_var: &str, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(key) = explicit_key(explicit, env_var)? {
        return Ok(key);
    }

    let key = dialoguer::Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm vault key", "Keys do not match, try again")
        .interact()
        .map_err(|e| ClamError::CommandFailed(format!("key prompt: {e}")))?;
    Ok(Zeroizing::new(key))
}

/// A key given on the command line or in the environment, if any.
fn explicit_key(flag: Option<&str>, env_var: &str) -> Result<Option<Zeroizing<String>>> {
    if let Some(key) = flag {
        if key.is_empty() {
            return Err(ClamError::CommandFailed("vault key cannot be empty".into()));
        }
        return Ok(Some(Zeroizing::new(key.to_string())));
    }

    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => Ok(Some(Zeroizing::new(key))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_flag_is_used() {
        let key = explicit_key(Some("abc123"), "CLAM_TEST_UNSET_VAR").unwrap();
        assert_eq!(key.as_deref().map(String::as_str), Some("abc123"));
    }

    #[test]
    fn empty_flag_is_rejected() {
        assert!(explicit_key(Some(""), "CLAM_TEST_UNSET_VAR").is_err());
    }

    #[test]
    fn missing_flag_and_env_yield_none() {
        assert!(explicit_key(None, "CLAM_TEST_UNSET_VAR").unwrap().is_none());
    }

    #[test]
    fn update_requires_a_change() {
        let result = Cli::try_parse_from(["clam", "update", "github"]);
        assert!(result.is_err());
    }

    #[test]
    fn add_username_requires_password() {
        let result = Cli::try_parse_from(["clam", "add", "github", "--username", "alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn add_file_conflicts_with_credentials() {
        let result = Cli::try_parse_from([
            "clam", "add", "github", "--file", "x", "--username", "a", "--password", "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_vault_list_with_info() {
        let cli = Cli::try_parse_from(["clam", "-k", "abc", "vault", "list", "--accounts", "--info"])
            .unwrap();
        assert_eq!(cli.key.as_deref(), Some("abc"));
        assert!(matches!(
            cli.command,
            Commands::Vault {
                action: VaultAction::List {
                    accounts: true,
                    info: true
                }
            }
        ));
    }
}
