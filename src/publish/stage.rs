use std::{fs, io, path::Path};

use anyhow::Context as _;
use tracing::{debug, info};

/// The directory under `doc/` receiving the documentation of `branch`: `latest` for the default
/// branch, the branch name made path-friendly otherwise.
///
/// ```rust
/// use lief_ci::publish::target_dir;
///
/// assert_eq!(target_dir("master", "master"), "latest");
/// assert_eq!(target_dir("release/0.15_x", "master"), "release-0.15-x");
/// ```
pub fn target_dir(branch: &str, default_branch: &str) -> String {
    if branch.is_empty() || branch == default_branch {
        "latest".to_owned()
    } else {
        branch.replace(['/', '_'], "-")
    }
}

/// Replaces the content of `dest` with the content of `src`, creating `dest` if needed.
///
/// Entries are moved, falling back to a copy when `src` and `dest` are on different file systems.
///
/// # Errors
///
/// Returns an error if `src` can't be read or an entry can't be moved.
pub fn stage_docs(src: &Path, dest: &Path) -> anyhow::Result<usize> {
    fs::create_dir_all(dest).with_context(|| format!("failed to create {}", dest.display()))?;

    for entry in fs::read_dir(dest)? {
        let path = entry?.path();
        debug!("removing {}", path.display());
        remove(&path)?;
    }

    let mut moved = 0;
    for entry in fs::read_dir(src).with_context(|| format!("failed to read {}", src.display()))? {
        let entry = entry?;
        let to = dest.join(entry.file_name());
        move_entry(&entry.path(), &to).with_context(|| {
            format!(
                "failed to move {} to {}",
                entry.path().display(),
                to.display()
            )
        })?;
        moved += 1;
    }

    info!("moved {moved} entries from {} to {}", src.display(), dest.display());
    Ok(moved)
}

fn remove(path: &Path) -> io::Result<()> {
    if path.is_dir() && !path.is_symlink() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn move_entry(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    copy_recursively(from, to)?;
    remove(from)
}

fn copy_recursively(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_recursively(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(from, to).map(|_| ())
    }
}
