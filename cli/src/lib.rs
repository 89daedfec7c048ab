//! `volunteers`: command-line front end for the volunteer directory.
//!
//! ## Commands
//!
//! - `volunteers list [--search T] [--category AAK] [--view grid|list]`
//! - `volunteers show <ID>`
//! - `volunteers add --name .. --code .. --mobile .. --address ..`
//! - `volunteers delete <ID> [--yes]`
//! - `volunteers categories`
//! - `volunteers health`
//! - `volunteers shell`
//!
//! ## Exit Codes
//!
//! - 0: Success (including mutations saved only to the local cache)
//! - 1: Failure (unknown id, invalid input, unhealthy service)
//! - 2: Configuration error

pub mod cli;
pub mod commands;
pub mod render;
pub mod shell;

pub use cli::{Cli, Command, GlobalArgs};

/// Exit codes for `volunteers`
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

/// Run a parsed command line and return the process exit code.
pub async fn run(cli: Cli) -> i32 {
    let config = match commands::resolve_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return exit_codes::CONFIG_ERROR;
        }
    };

    match commands::execute(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::FAILURE
        }
    }
}
