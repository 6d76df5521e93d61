//! Blocking subprocess invocations behind the [`Shell`] trait.

use std::{
    ffi::OsString,
    fmt::{self, Display},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use anyhow::Context as _;
use tracing::debug;

use crate::{Error, Result};

/// A program to run, with its arguments, working directory and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The program to run, looked up in `PATH` if it is not a path.
    pub program: OsString,
    /// The arguments passed to the program.
    pub args: Vec<OsString>,
    /// The working directory, or the current one if [`None`].
    pub cwd: Option<PathBuf>,
    /// Environment variables set on top of the inherited environment.
    pub envs: Vec<(OsString, OsString)>,
    /// Whether the output of the program is discarded instead of inherited.
    pub quiet: bool,
    /// Whether the arguments hold secrets, and are left out of logs and errors.
    pub sensitive: bool,
}

impl Invocation {
    /// Creates an [`Invocation`] of `program` without arguments.
    pub fn new<S>(program: S) -> Self
    where
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            quiet: false,
            sensitive: false,
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg<S>(mut self, arg: S) -> Self
    where
        S: Into<OsString>,
    {
        self.args.push(arg.into());
        self
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the program in `dir`.
    #[must_use]
    pub fn current_dir<P>(mut self, dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets environment variables for the program.
    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.envs
            .extend(envs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Discards the output of the program.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Keeps the arguments out of logs and errors.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// The program followed by its arguments, as strings.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).envs(self.envs.iter().cloned());
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sensitive {
            write!(f, "{} [redacted]", self.program.to_string_lossy())
        } else {
            write!(f, "{}", self.argv().join(" "))
        }
    }
}

/// Runs [`Invocation`]s to completion.
pub trait Shell {
    /// Runs the invocation and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the program could not be started.
    fn status(&self, invocation: &Invocation) -> Result<ExitStatus>;

    /// Runs the invocation and captures its standard output.
    ///
    /// # Errors
    ///
    /// Returns an error if the program could not be started or exited unsuccessfully.
    fn output(&self, invocation: &Invocation) -> Result<String>;

    /// Runs the invocation, failing on an unsuccessful exit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Subprocess`] if the program exited unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<()> {
        let status = self.status(invocation)?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::Subprocess {
                command: invocation.to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// Spawns real processes with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn status(&self, invocation: &Invocation) -> Result<ExitStatus> {
        debug!("executing: {invocation}");
        let mut command = invocation.command();
        if invocation.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = command
            .status()
            .with_context(|| format!("failed to run {invocation}"))?;
        if !status.success() {
            debug!("{invocation} exited with {status}");
        }
        Ok(status)
    }

    fn output(&self, invocation: &Invocation) -> Result<String> {
        debug!("executing: {invocation}");
        let output = invocation
            .command()
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("failed to run {invocation}"))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::Subprocess {
                command: invocation.to_string(),
                status: output.status.to_string(),
            })
        }
    }
}
