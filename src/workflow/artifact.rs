//! Artifacts from GitHub REST API and the artifacts the bootstrap expects.

use std::fmt::Display;

use serde::Deserialize;

use crate::{Error, python::PythonVersion};

/// Represents artifacts from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct Artifacts {
    /// The total number of artifacts of the run.
    #[serde(default)]
    pub total_count: u64,
    /// The artifacts in this page.
    pub artifacts: Vec<Artifact>,
}

/// Represents an artifact from GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The artifact id.
    #[serde(default)]
    pub id: u64,
    /// The name given by the workflow when uploading.
    pub name: String,
    /// The size of the zip archive.
    pub size_in_bytes: u64,
    /// The endpoint serving the zip archive.
    pub archive_download_url: String,
    /// Whether the artifact passed its retention period.
    pub expired: bool,
}

impl Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.name,
            human_size(self.size_in_bytes),
            self.archive_download_url
        )
    }
}

/// The artifacts a run must publish.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The C/C++ SDK tarball, wrapped in a zip archive.
    Sdk,
    /// The Python wheels, one per interpreter, wrapped in a zip archive.
    Wheel,
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sdk => write!(f, "SDK"),
            Self::Wheel => write!(f, "Python wheel"),
        }
    }
}

/// Maps artifact names to [`ArtifactKind`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    /// The name of the [`ArtifactKind::Sdk`] artifact.
    pub sdk: String,
    /// The name of the [`ArtifactKind::Wheel`] artifact.
    pub wheel: String,
}

impl ArtifactNames {
    /// The names published for `platform`, the wheel being the one built for `python`.
    ///
    /// ```rust
    /// use lief_ci::{python::PythonVersion, workflow::artifact::ArtifactNames};
    ///
    /// let names = ArtifactNames::new("linux-x86-64", PythonVersion::new(3, 11));
    /// assert_eq!(names.sdk, "linux-x86-64-sdk");
    /// assert_eq!(names.wheel, "linux-x86-64-python-wheel-3.11");
    /// ```
    pub fn new(platform: &str, python: PythonVersion) -> Self {
        Self {
            sdk: format!("{platform}-sdk"),
            wheel: format!("{platform}-python-wheel-{python}"),
        }
    }

    /// Finds the kind of the artifact named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownArtifact`] if the name is none of the expected ones.
    pub fn kind_of(&self, name: &str) -> Result<ArtifactKind, Error> {
        match name {
            _ if name == self.sdk => Ok(ArtifactKind::Sdk),
            _ if name == self.wheel => Ok(ArtifactKind::Wheel),
            _ => Err(Error::UnknownArtifact(name.to_owned())),
        }
    }
}

/// Formats a byte count with binary prefixes, e.g. `1.5MiB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size.abs() < 1024.0 {
            return format!("{size:.1}{unit}B");
        }
        size /= 1024.0;
    }
    format!("{size:.1}YiB")
}
