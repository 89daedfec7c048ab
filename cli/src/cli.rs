//! Argument definitions for the `volunteers` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use volunteer_directory::ViewMode;

/// Browse and maintain the volunteer directory.
///
/// Reads from the remote directory service when it is reachable and falls
/// back to the local cache (or sample data) when it is not.
#[derive(Debug, Parser)]
#[command(name = "volunteers", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Config file (default: $VOLUNTEER_DIRECTORY_CONFIG or
    /// ~/.config/volunteer-directory/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory API base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory for the local cache
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Remote request timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Output as JSON for automation
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List volunteers, optionally filtered
    List(ListArgs),

    /// Show one volunteer's ID card
    Show(ShowArgs),

    /// Register a new volunteer
    ///
    /// Saved locally when the remote directory is unavailable.
    Add(AddArgs),

    /// Delete a volunteer
    Delete(DeleteArgs),

    /// List the distinct AAK numbers
    Categories,

    /// Probe the remote directory service
    Health,

    /// Interactive session
    Shell,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Match name, AAK number, mobile or address
    #[arg(long, short = 's', value_name = "TERM")]
    pub search: Option<String>,

    /// Only show this exact AAK number
    #[arg(long, short = 'c', value_name = "AAK")]
    pub category: Option<String>,

    /// Layout: grid or list
    #[arg(long, default_value = "grid", value_parser = parse_view_mode)]
    pub view: ViewMode,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Volunteer id
    pub id: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// AAK membership number
    #[arg(long = "code", value_name = "AAK")]
    pub code: String,

    /// Mobile number
    #[arg(long)]
    pub mobile: String,

    #[arg(long)]
    pub address: String,

    /// Hosted photo URL
    #[arg(long, value_name = "URL", conflicts_with = "photo")]
    pub image_url: Option<String>,

    /// Photo file, embedded as a data URI
    #[arg(long, value_name = "PATH")]
    pub photo: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Volunteer id
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn parse_view_mode(s: &str) -> Result<ViewMode, String> {
    s.parse()
}
