//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::record::Kind;

/// Serve command arguments.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Directory holding the collection files (overrides `storage.data_dir`)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Which collection to print
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Print the stored records as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Kind of the record to export
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Id of the record to export
    pub id: u64,

    /// Output file (defaults to `<kind>_<id>.pdf`)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ExportCommand {
    /// Where the PDF is written.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_{}.pdf", Kind::from(self.kind), self.id)))
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Record kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Character sheets
    Character,
    /// Vehicle sheets
    Vehicle,
    /// Crew sheets
    Crew,
}

impl From<KindArg> for Kind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Character => Self::Character,
            KindArg::Vehicle => Self::Vehicle,
            KindArg::Crew => Self::Crew,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_arg_conversion() {
        assert_eq!(Kind::from(KindArg::Character), Kind::Character);
        assert_eq!(Kind::from(KindArg::Vehicle), Kind::Vehicle);
        assert_eq!(Kind::from(KindArg::Crew), Kind::Crew);
    }

    #[test]
    fn test_export_default_output_path() {
        let cmd = ExportCommand {
            kind: KindArg::Vehicle,
            id: 7,
            output: None,
        };
        assert_eq!(cmd.output_path(), PathBuf::from("vehicle_7.pdf"));
    }

    #[test]
    fn test_export_explicit_output_path() {
        let cmd = ExportCommand {
            kind: KindArg::Crew,
            id: 1,
            output: Some(PathBuf::from("/tmp/gang.pdf")),
        };
        assert_eq!(cmd.output_path(), PathBuf::from("/tmp/gang.pdf"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_kind_arg_debug() {
        assert_eq!(format!("{:?}", KindArg::Crew), "Crew");
    }
}
