use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "devstrap",
    about = "Render YAML config templates and apply them to this machine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Render files but only log git, rc file and PATH changes
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve variables, render templates and configure this machine
    Setup(SetupOpts),
    /// Re-run setup for an existing output directory using its cached answers
    Refresh(RefreshOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Refresh(_) => "refresh",
            Self::Version => "version",
        }
    }
}

/// Options for the `setup` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SetupOpts {
    /// Repository containing `config_template/` (default: $DEVSTRAP_REPO or
    /// the current directory)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Directory for rendered files and generated scripts (prompted if absent)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Options for the `refresh` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RefreshOpts {
    /// Output directory of a previous `setup` run
    pub out_dir: PathBuf,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_setup_defaults() {
        let cli = Cli::parse_from(["devstrap", "setup"]);
        assert!(
            matches!(&cli.command, Command::Setup(opts) if opts.repo.is_none() && opts.out_dir.is_none())
        );
        assert!(!cli.global.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_setup_with_paths() {
        let cli = Cli::parse_from([
            "devstrap", "setup", "--repo", "/src/env", "--out-dir", "~/devenv",
        ]);
        assert!(
            matches!(&cli.command, Command::Setup(_)),
            "Expected Setup command"
        );
        if let Command::Setup(opts) = cli.command {
            assert_eq!(opts.repo, Some(PathBuf::from("/src/env")));
            assert_eq!(opts.out_dir, Some(PathBuf::from("~/devenv")));
        }
    }

    #[test]
    fn parse_refresh_requires_out_dir() {
        assert!(Cli::try_parse_from(["devstrap", "refresh"]).is_err());
        let cli = Cli::parse_from(["devstrap", "refresh", "/home/u/devenv"]);
        assert!(
            matches!(&cli.command, Command::Refresh(opts) if opts.out_dir == PathBuf::from("/home/u/devenv"))
        );
    }

    #[test]
    fn parse_dry_run_after_subcommand() {
        let cli = Cli::parse_from(["devstrap", "setup", "-d"]);
        assert!(cli.global.dry_run);
        let cli = Cli::parse_from(["devstrap", "--dry-run", "refresh", "out"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["devstrap", "-v", "version"]);
        assert!(cli.verbose);
        assert_eq!(cli.command.name(), "version");
    }
}
