//! CLI argument definitions for Deckhand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Deckhand - Commander decklist analysis and deck building.
///
/// Output is JSON by default so AI agents and scripts can consume it;
/// pass -H for human-readable output.
#[derive(Parser, Debug)]
#[command(name = "dh")]
#[command(author, version, about = "Analyze and build Commander decklists", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Data directory holding config.toml and data overrides.
    /// Can also be set via the DH_DATA_DIR environment variable.
    #[arg(short = 'd', long = "data-dir", global = true, env = "DH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a decklist against a template and bracket
    ///
    /// Reads the decklist from --file, or from stdin when no file is given.
    Analyze {
        /// Decklist file ("3 Island" per line; blank lines and # comments ignored)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Template id (defaults to the configured template)
        #[arg(short, long)]
        template: Option<String>,

        /// Bracket id (defaults to the template id)
        #[arg(short, long)]
        bracket: Option<String>,

        /// Commander name, echoed into the report
        #[arg(short, long)]
        commander: Option<String>,
    },

    /// Build a skeleton deck for a commander
    Build {
        /// Commander name (must resolve in the card database)
        commander: String,

        /// Template id (defaults to the configured template)
        #[arg(short, long)]
        template: Option<String>,

        /// Bracket id (defaults to the template id)
        #[arg(short, long)]
        bracket: Option<String>,

        /// Card to include at one copy; repeatable
        #[arg(short, long = "seed")]
        seed: Vec<String>,

        /// Fetch ranked recommendations for the color identity
        #[arg(short, long)]
        recommend: bool,

        /// Autofill category deficits from recommendations (implies --recommend)
        #[arg(short, long)]
        autofill: bool,
    },

    /// Show a card's database record and classified roles
    Card {
        /// Card name (case-insensitive)
        name: String,
    },

    /// MCP server commands
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },
}

/// MCP subcommands
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start the stdio MCP server (line-delimited JSON-RPC 2.0)
    Serve,
    /// Print the tool manifest
    Manifest,
}
