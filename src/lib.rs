pub mod cli;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod registry;
pub mod vault;
