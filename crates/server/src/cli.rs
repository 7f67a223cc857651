//! CLI argument parsing.

use clap::{Parser, Subcommand};

/// Serve the flight-route leaderboard from BigQuery.
#[derive(Parser, Debug)]
#[command(name = "skyquery", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given)
    Serve {
        /// Listen host, overrides HOST
        #[arg(long)]
        host: Option<String>,

        /// Listen port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the query once and print the rows to stdout
    Query,
    /// List the datasets visible to the ambient project
    Datasets,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }
}
