use anyhow::{Context as _, Result};
use clap::Parser;

use devstrap::cli::{Cli, Command};
use devstrap::commands::{self, Host};
use devstrap::exec::SystemExecutor;
use devstrap::logging::{Logger, init_subscriber};
use devstrap::platform::Platform;
use devstrap::prompt::ConsolePrompt;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    init_subscriber(args.verbose, args.command.name());
    let log = Logger::new(args.command.name());
    let host = Host {
        platform: Platform::detect(),
        executor: &SystemExecutor,
        answers: &ConsolePrompt,
        home: dirs::home_dir().context("cannot determine the home directory")?,
    };

    match &args.command {
        Command::Setup(opts) => commands::setup::run(&args.global, opts, &host, &log),
        Command::Refresh(opts) => commands::refresh::run(&args.global, opts, &host, &log),
        Command::Version => Ok(()),
    }
}
