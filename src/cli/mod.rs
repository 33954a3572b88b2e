//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the release
//! publisher using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Release Publisher - completes publishing for approved release versions
#[derive(Parser, Debug)]
#[command(name = "release-publisher")]
#[command(version, about, long_about = None)]
#[command(author = "Release Publisher Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "publisher.toml", env = "PUBLISHER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PUBLISHER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Complete publishing for a batch of release versions
    Publish(commands::publish::PublishArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show publishing attempts for release versions
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "7d44b88c-4199-4bad-97dc-d78268e01398";
    const OTHER: &str = "0b5f3f5e-9a52-4d8e-8f0e-3a1c2b4d5e6f";

    #[test]
    fn test_cli_parse_publish() {
        let cli = Cli::parse_from(["release-publisher", "publish", "--release-version-id", ID]);
        assert_eq!(cli.config, "publisher.toml");
        match cli.command {
            Commands::Publish(args) => assert_eq!(args.release_version_ids, vec![ID]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_publish_comma_separated() {
        let ids = format!("{ID},{OTHER}");
        let cli = Cli::parse_from(["release-publisher", "publish", "--release-version-id", &ids]);
        match cli.command {
            Commands::Publish(args) => assert_eq!(args.release_version_ids.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_publish_requires_ids_or_input() {
        assert!(Cli::try_parse_from(["release-publisher", "publish"]).is_err());
        assert!(Cli::try_parse_from([
            "release-publisher",
            "publish",
            "--input",
            "request.json",
            "--release-version-id",
            ID,
        ])
        .is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from([
            "release-publisher",
            "--config",
            "custom.toml",
            "publish",
            "--input",
            "request.json",
        ]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["release-publisher", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["release-publisher", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from([
            "release-publisher",
            "status",
            "--release-version-id",
            ID,
            "--stage",
            "Failed",
        ]);
        assert!(matches!(cli.command, Commands::Status(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["release-publisher", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
