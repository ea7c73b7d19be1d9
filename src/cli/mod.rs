//! Command-line interface for gymdesk.

use clap::{Parser, Subcommand};

/// gymdesk - gym back-office API
#[derive(Parser)]
#[command(name = "gymdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config.toml in the working directory
    Init,

    /// Load and validate configuration, then exit
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["gymdesk"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parses_subcommands() {
        let cli = Cli::try_parse_from(["gymdesk", "daemon"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve));

        let cli = Cli::try_parse_from(["gymdesk", "check-config"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["gymdesk", "explode"]).is_err());
    }
}
