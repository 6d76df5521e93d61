use std::path::Path;

use tracing::{error, info};

use crate::{
    framework::State,
    transactions::{find_entry, open_archive, unpack_tarball},
};

/// The prefix of the SDK tarball inside the SDK artifact.
pub const SDK_PREFIX: &str = "LIEF-";
/// The suffix of the SDK tarball inside the SDK artifact.
pub const SDK_SUFFIX: &str = ".tar.gz";

/// Extracts the SDK tarball found in the artifact `archive` into `output_dir`.
///
/// Returns the name of the extracted tarball, or [`None`] if the artifact holds no SDK tarball, in
/// which case nothing is written.
///
/// # Errors
///
/// Returns an error if the artifact or the tarball is corrupted, or if writing fails.
pub fn extract_sdk(archive: &[u8], output_dir: &Path) -> anyhow::Result<Option<String>> {
    let mut archive = open_archive(archive)?;
    let Some(name) = find_entry(&archive, |name| {
        name.starts_with(SDK_PREFIX) && name.ends_with(SDK_SUFFIX)
    }) else {
        return Ok(None);
    };

    info!("extracting {name} in {}…", output_dir.display());
    let tarball = archive.by_name(&name)?;
    unpack_tarball(tarball, output_dir)?;
    Ok(Some(name))
}

/// Installs the SDK artifact `archive` into `output_dir`.
///
/// A missing or corrupted SDK is reported as a failure to retry.
pub fn install_sdk(archive: &[u8], output_dir: &Path) -> State<()> {
    match extract_sdk(archive, output_dir) {
        Ok(Some(name)) => {
            info!("LIEF SDK {name} extracted");
            State::Success(())
        }
        Ok(None) => {
            error!("no {SDK_PREFIX}*{SDK_SUFFIX} in the SDK artifact");
            State::Retry
        }
        Err(err) => {
            error!("error while extracting the SDK: {err:#}");
            State::Retry
        }
    }
}
