//! Installs the LIEF SDK and Python wheel built by the latest successful CI run.

use std::process::ExitCode;

use clap::Parser as _;
use lief_ci::{
    command::SystemShell,
    env::BootstrapArgs,
    framework::ThreadSleep,
    logging::init_tracing,
    python::Pip,
    transactions::bootstrap,
    workflow::GitHubClient,
};
use tracing::error;

fn main() -> ExitCode {
    let args = match BootstrapArgs::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            drop(err.print());
            return ExitCode::FAILURE;
        }
        Err(err) => err.exit(),
    };

    if let Err(err) = init_tracing("info") {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("bootstrap failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: BootstrapArgs) -> lief_ci::Result<()> {
    let config = args.into_config(&SystemShell)?;
    let client = GitHubClient::new(&config.api)?;
    let pip = Pip::new(&config.python, &SystemShell);
    bootstrap(&client, &pip, &ThreadSleep, &config)
}
