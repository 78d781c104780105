use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Push-to-talk assistant client for an n8n MCP workflow backend.
#[derive(Debug, Parser)]
#[command(name = "strata", version, about)]
pub struct Cli {
    /// Settings file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Override the MCP endpoint URL for this invocation.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Override the MCP bearer token for this invocation.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Override the workflow id for this invocation.
    #[arg(long, global = true)]
    pub workflow: Option<String>,

    /// Give up on a backend request after this many seconds. Unbounded by default.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the backend is reachable and the token is accepted.
    Test,
    /// Send one message to the workflow and print the reply.
    Send {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Read transcripts from stdin, one per line, and print each reply.
    Chat,
    /// List the tools exposed by the backend.
    Tools,
    /// List the workflows visible to the configured token.
    Workflows,
    /// Inspect or change stored settings.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print every setting; credentials are masked.
    Show,
    /// Store a setting.
    Set { key: String, value: String },
    /// Print the settings file location.
    Path,
}
