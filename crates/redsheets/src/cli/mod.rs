//! Command-line interface for redsheets.
//!
//! This module provides the CLI structure for the `redsheets` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ExportCommand, KindArg, ListCommand, ServeCommand};

/// redsheets - Cyberpunk RED sheets for characters, vehicles and crews
///
/// Serves the sheet editor over HTTP, keeps each collection in a JSON file
/// and exports printable sheets as PDF.
#[derive(Debug, Parser)]
#[command(name = "redsheets")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Print a stored collection
    List(ListCommand),

    /// Render one record to a PDF file
    Export(ExportCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }

    /// Log destination for the chosen command.
    #[must_use]
    pub fn log_output(&self) -> crate::logging::LogOutput {
        match self.command {
            Command::Serve(_) => crate::logging::LogOutput::Server,
            _ => crate::logging::LogOutput::Command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Serve(ServeCommand::default()),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "redsheets");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_log_output_follows_command() {
        use crate::logging::LogOutput;

        assert_eq!(cli(0, false).log_output(), LogOutput::Server);
        let list = Cli::try_parse_from(["redsheets", "list", "crew"]).unwrap();
        assert_eq!(list.log_output(), LogOutput::Command);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "redsheets",
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--data-dir",
            "/srv/sheets",
        ])
        .unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.bind, Some("0.0.0.0:8080".parse().unwrap()));
        assert_eq!(serve.data_dir, Some(PathBuf::from("/srv/sheets")));
    }

    #[test]
    fn test_parse_serve_rejects_bad_bind() {
        assert!(Cli::try_parse_from(["redsheets", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["redsheets", "list", "vehicle", "--json"]).unwrap();
        let Command::List(list) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(list.kind, KindArg::Vehicle);
        assert!(list.json);
    }

    #[test]
    fn test_parse_list_unknown_kind() {
        assert!(Cli::try_parse_from(["redsheets", "list", "widget"]).is_err());
    }

    #[test]
    fn test_parse_export() {
        let cli =
            Cli::try_parse_from(["redsheets", "export", "character", "3", "-o", "out.pdf"]).unwrap();
        let Command::Export(export) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(export.kind, KindArg::Character);
        assert_eq!(export.id, 3);
        assert_eq!(export.output, Some(PathBuf::from("out.pdf")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["redsheets", "config", "validate", "-f", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli =
            Cli::try_parse_from(["redsheets", "-c", "/custom/config.toml", "config", "path"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["redsheets", "-v", "serve"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(["redsheets", "-q", "serve"]).unwrap();
        assert!(cli.quiet);
    }
}
