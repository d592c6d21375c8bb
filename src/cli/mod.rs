//! CLI module for yamlpane
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod headless;
pub mod output;
pub mod position;

pub use output::OutputContext;

use clap::{Parser, Subcommand};

use commands::{
    breadcrumbs::BreadcrumbsArgs, check::CheckArgs, config::ConfigArgs, doctor::DoctorArgs,
};

const LONG_ABOUT: &str = r#"
yamlpane - schema-validated YAML editing panes

Mounts the YAML editor component headlessly against yaml-language-server and
prints what its breadcrumbs and problems panes would show.

EXAMPLES:
  yamlpane check deploy.yaml --schema https://json.schemastore.org/github-workflow.json
  yamlpane breadcrumbs deploy.yaml --schema file:///schemas/app.json --at 12:7
  yamlpane breadcrumbs deploy.yaml --schema file:///schemas/app.json --at 12 --html
  yamlpane doctor --offline
"#;

/// yamlpane - schema-validated YAML editing panes
#[derive(Parser, Debug)]
#[command(name = "yamlpane")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'yamlpane <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate YAML files against a schema and list problems
    Check(CheckArgs),

    /// Show the structural path under a cursor position
    Breadcrumbs(BreadcrumbsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Check that yaml-language-server is installed and answers the handshake
    Doctor(DoctorArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "yamlpane", "check", "a.yaml", "b.yaml", "--schema", "file:///s.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.schema, "file:///s.json");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_breadcrumbs_requires_position() {
        assert!(
            Cli::try_parse_from(["yamlpane", "breadcrumbs", "a.yaml", "--schema", "s"]).is_err()
        );
    }

    #[test]
    fn test_doctor_offline_flag() {
        let cli = Cli::try_parse_from(["yamlpane", "doctor", "--offline"]).unwrap();
        assert!(matches!(cli.command, Commands::Doctor(DoctorArgs { offline: true })));
    }
}
