//! Publishes the generated documentation to the website repository.

use std::process::ExitCode;

use clap::Parser as _;
use lief_ci::{command::SystemShell, env::PublishArgs, logging::init_tracing, publish::publish};
use tracing::error;

fn main() -> ExitCode {
    let args = match PublishArgs::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            drop(err.print());
            return ExitCode::FAILURE;
        }
        Err(err) => err.exit(),
    };

    if let Err(err) = init_tracing("debug") {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match args.into_config().and_then(|config| publish(&config, &SystemShell)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("failed to publish the documentation: {err}");
            ExitCode::FAILURE
        }
    }
}
