//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Collect Polarion defect metrics by severity and resolution
#[derive(Parser)]
#[command(name = "polarion-metrics")]
#[command(about = "polarion-metrics - Report Polarion defect distributions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file (defaults to ./polarion.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch defects, aggregate them and store the measures (default command)
    #[command(name = "analyze")]
    Analyze {
        /// Polarion server base URL
        #[arg(long)]
        url: Option<String>,

        /// Project whose defects are counted
        #[arg(short = 'p', long)]
        project: Option<String>,

        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Timeout in seconds for each remote call
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Validate the configuration without contacting the server
    #[command(name = "check")]
    Check,

    /// Print the measures stored by the last runs
    #[command(name = "show")]
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the metrics this tool reports
    #[command(name = "metrics")]
    Metrics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_overrides() {
        let cli = Cli::try_parse_from([
            "polarion-metrics",
            "-vv",
            "analyze",
            "--project",
            "elibrary",
            "--timeout",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Analyze {
                project, timeout, ..
            }) => {
                assert_eq!(project.as_deref(), Some("elibrary"));
                assert_eq!(timeout, Some(5));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["polarion-metrics", "--config", "x.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
