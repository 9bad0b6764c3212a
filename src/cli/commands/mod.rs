//! One module per CLI command.  Each exposes an `execute` function
//! called from `main`.

pub mod add;
pub mod clip;
pub mod print;
pub mod update;
pub mod vault_add;
pub mod vault_delete;
pub mod vault_list;
pub mod vault_switch;
pub mod vault_update;
