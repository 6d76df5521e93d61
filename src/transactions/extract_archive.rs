use std::{
    fs,
    io::{self, Cursor, Read, Seek},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use flate2::read::GzDecoder;
use tracing::debug;
use zip::ZipArchive;

/// Opens a downloaded artifact as a zip archive.
///
/// # Errors
///
/// Returns an error if `bytes` is not a zip archive.
pub fn open_archive(bytes: &[u8]) -> anyhow::Result<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(bytes)).context("invalid zip archive")
}

/// Finds the name of the first entry of `archive` accepted by `predicate`.
pub fn find_entry<R, F>(archive: &ZipArchive<R>, predicate: F) -> Option<String>
where
    R: Read + Seek,
    F: Fn(&str) -> bool,
{
    (0..archive.len())
        .filter_map(|index| archive.name_for_index(index))
        .find(|name| predicate(name))
        .map(str::to_owned)
}

/// Sanitizes an entry name into a relative path, dropping components that would escape the
/// destination.
fn sanitize_file_path(path: &str) -> PathBuf {
    // Replaces backwards slashes
    path.replace('\\', "/")
        // Sanitizes each component
        .split('/')
        .map(sanitize_filename::sanitize)
        .filter(|component| !component.is_empty())
        .collect()
}

/// Extracts the entry `name` of `archive` into `dir`, creating intermediate directories, and
/// returns the path of the extracted file.
///
/// # Errors
///
/// Returns an error if the entry is missing or can't be written.
pub fn extract_entry<R>(
    archive: &mut ZipArchive<R>,
    name: &str,
    dir: &Path,
) -> anyhow::Result<PathBuf>
where
    R: Read + Seek,
{
    let path = dir.join(sanitize_file_path(name));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut entry = archive.by_name(name)?;
    let mut file = fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    io::copy(&mut entry, &mut file)?;
    debug!("extracted {name} to {}", path.display());
    Ok(path)
}

/// Stream-decompresses a gzipped tarball into `dir`, overwriting existing files.
///
/// # Errors
///
/// Returns an error if the tarball is invalid or can't be unpacked.
pub fn unpack_tarball<R>(reader: R, dir: &Path) -> anyhow::Result<()>
where
    R: Read,
{
    let mut tarball = tar::Archive::new(GzDecoder::new(reader));
    tarball.set_overwrite(true);
    tarball
        .unpack(dir)
        .with_context(|| format!("failed to unpack tarball in {}", dir.display()))
}
