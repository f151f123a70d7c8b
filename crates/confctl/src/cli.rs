//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use types::SerializerFormat;

/// Inspect configuration values and resolve `${...}` references
#[derive(Debug, Parser)]
#[command(name = "confctl", version, about)]
pub struct Cli {
    /// Settings file (YAML); defaults and CONFRES_* variables are used otherwise
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Configuration file to load, may be repeated (later files win)
    #[arg(short, long = "file", global = true)]
    pub files: Vec<PathBuf>,

    /// Environment variable prefix for `${env:NAME}` references
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Do not merge prefixed environment variables into the store
    #[arg(long, global = true)]
    pub no_env_layer: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the resolved value stored at KEY
    Get {
        key: String,
        /// Decode the value (or section) and print it as JSON
        #[arg(long)]
        format: Option<SerializerFormat>,
    },
    /// Resolve every reference in TEXT
    Resolve { text: String },
    /// Print the normalized form of KEY
    Normalize {
        key: String,
        /// Normalize for an environment variable name instead of a store lookup
        #[arg(long)]
        env: bool,
    },
    /// Print the resolved value of a (prefixed) environment variable
    Env { name: String },
    /// Validate the settings and print the report
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_format() {
        let cli = Cli::try_parse_from([
            "confctl", "-f", "a.json", "--file", "b.yaml", "get", "database", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.files.len(), 2);
        match cli.command {
            Command::Get { key, format } => {
                assert_eq!(key, "database");
                assert_eq!(format, Some(SerializerFormat::Json));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = ["confctl", "normalize", "a/b", "--env", "--prefix", "APP_"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.prefix.as_deref(), Some("APP_"));
        assert!(matches!(cli.command, Command::Normalize { env: true, .. }));
    }
}
