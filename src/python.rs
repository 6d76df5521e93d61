//! The Python interpreter the wheel is installed into.

#![cfg(feature = "bootstrap")]

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context as _, anyhow};
use tracing::info;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    command::{Invocation, Shell},
};

/// The major and minor version of a CPython interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PythonVersion {
    /// The major version, `3` for Python 3.11.
    pub major: u8,
    /// The minor version, `11` for Python 3.11.
    pub minor: u8,
}

impl PythonVersion {
    /// Creates a [`PythonVersion`].
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// The binary compatibility tag embedded in wheel file names, e.g. `cp311-cp311`.
    pub fn abi_tag(&self) -> String {
        format!(
            "cp{major}{minor}-cp{major}{minor}",
            major = self.major,
            minor = self.minor
        )
    }

    /// Asks `python` for its version.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpreter can't be run or prints something unexpected.
    pub fn detect<S>(shell: &S, python: &Path) -> Result<Self>
    where
        S: Shell + ?Sized,
    {
        let output = shell.output(&Invocation::new(python).args([
            "-c",
            "import sys; print('%d.%d' % sys.version_info[:2])",
        ]))?;
        let version = output
            .trim()
            .parse::<Self>()
            .with_context(|| format!("unexpected version from {}", python.display()))?;
        info!("detected Python {version} at {}", python.display());
        Ok(version)
    }
}

impl Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| anyhow!("expected <major>.<minor>, got {s:?}"))?;
        Ok(Self {
            major: major.parse::<u8>().with_context(|| format!("invalid major version {major:?}"))?,
            minor: minor.parse::<u8>().with_context(|| format!("invalid minor version {minor:?}"))?,
        })
    }
}

/// Installs a Python package file.
#[cfg_attr(test, automock)]
pub trait PackageInstaller {
    /// Installs the package at `package`, replacing any installed version.
    ///
    /// # Errors
    ///
    /// Returns an error if the installation fails.
    fn install(&self, package: &Path) -> Result<()>;
}

/// Installs packages with `<python> -m pip`.
#[derive(Debug)]
pub struct Pip<'a, S: ?Sized> {
    python: PathBuf,
    shell: &'a S,
}

impl<'a, S> Pip<'a, S>
where
    S: Shell + ?Sized,
{
    /// Creates a [`Pip`] installing into `python`.
    pub fn new<P>(python: P, shell: &'a S) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            python: python.into(),
            shell,
        }
    }

    /// The invocation installing `package`.
    pub fn invocation(&self, package: &Path) -> Invocation {
        Invocation::new(&self.python)
            .args(["-m", "pip", "install", "--no-cache-dir", "--force-reinstall"])
            .arg(package)
    }
}

impl<S> PackageInstaller for Pip<'_, S>
where
    S: Shell + ?Sized,
{
    fn install(&self, package: &Path) -> Result<()> {
        let invocation = self.invocation(package);
        info!("executing: {invocation}");
        self.shell.run(&invocation)
    }
}
