//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marknote: markdown notes publisher and API server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Workspace root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Markdown store directory path (relative to workspace root)
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// Output directory path (relative to workspace root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: marknote.toml)
    #[arg(short = 'C', long, default_value = "marknote.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Init a workspace with default folders and config
    Init {
        /// the name(path) of workspace directory, related to `root`
        name: Option<PathBuf>,
    },

    /// Regenerate every viewer page and the index page once
    Build,

    /// Watch the markdown store and regenerate on change
    Watch,

    /// Serve the API and the generated pages. Regenerate on change automatically
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
}
