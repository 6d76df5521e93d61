use tracing::{error, info};

use crate::{
    framework::State,
    python::PackageInstaller,
    transactions::{extract_entry, find_entry, open_archive},
};

/// Installs the wheel built for the ABI `abi_tag` (e.g. `cp311-cp311`) from the artifact `archive`.
///
/// The wheel is extracted to a temporary directory, removed once the installer returns. A missing
/// wheel, a corrupted artifact or a failed installation is reported as a failure to retry.
pub fn install_wheel<P>(archive: &[u8], abi_tag: &str, installer: &P) -> State<()>
where
    P: PackageInstaller + ?Sized,
{
    let mut archive = match open_archive(archive) {
        Ok(archive) => archive,
        Err(err) => {
            error!("error while opening the Python wheel artifact: {err:#}");
            return State::Retry;
        }
    };

    let Some(name) = find_entry(&archive, |name| name.contains(abi_tag)) else {
        error!("no Python wheel for {abi_tag} in the artifact");
        return State::Retry;
    };

    let tmp = match tempfile::tempdir() {
        Ok(tmp) => tmp,
        Err(err) => {
            error!("failed to create a temporary directory: {err}");
            return State::Retry;
        }
    };

    info!("extracting {name} in {}…", tmp.path().display());
    let wheel = match extract_entry(&mut archive, &name, tmp.path()) {
        Ok(wheel) => wheel,
        Err(err) => {
            error!("error while extracting {name}: {err:#}");
            return State::Retry;
        }
    };

    match installer.install(&wheel) {
        Ok(()) => {
            info!("LIEF Python wheel {name} installed");
            State::Success(())
        }
        Err(err) => {
            error!("error while installing the Python wheel: {err}");
            State::Retry
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::{
        Error,
        python::{MockPackageInstaller, PythonVersion},
        transactions::fixtures::{wheel_artifact, zip_of},
    };

    #[test]
    fn installs_the_matching_wheel_once() {
        let installed = Arc::new(Mutex::new(None::<PathBuf>));
        let mut installer = MockPackageInstaller::new();
        installer
            .expect_install()
            .withf(|wheel: &Path| {
                wheel.ends_with("lief-1.2.3-cp311-cp311-manylinux_2_28_x86_64.whl")
                    && std::fs::read(wheel).is_ok_and(|data| data == b"wheel 3.11")
            })
            .times(1)
            .returning({
                let installed = Arc::clone(&installed);
                move |wheel| {
                    *installed.lock().unwrap() = Some(wheel.to_path_buf());
                    Ok(())
                }
            });

        let tag = PythonVersion::new(3, 11).abi_tag();
        assert!(install_wheel(&wheel_artifact(), &tag, &installer).is_success());

        let wheel = installed.lock().unwrap().clone().unwrap();
        assert!(!wheel.exists(), "the temporary directory must be removed");
    }

    #[test]
    fn missing_wheel_is_retried() {
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().never();

        let tag = PythonVersion::new(3, 9).abi_tag();
        assert!(matches!(
            install_wheel(&wheel_artifact(), &tag, &installer),
            State::Retry
        ));
    }

    #[test]
    fn failed_installation_is_retried_and_cleaned_up() {
        let installed = Arc::new(Mutex::new(None::<PathBuf>));
        let mut installer = MockPackageInstaller::new();
        installer.expect_install().times(1).returning({
            let installed = Arc::clone(&installed);
            move |wheel| {
                *installed.lock().unwrap() = Some(wheel.to_path_buf());
                Err(Error::Subprocess {
                    command: "pip install".to_owned(),
                    status: "exit status: 1".to_owned(),
                })
            }
        });

        let archive = zip_of(&[("dist/lief-1.2.3-cp312-cp312-win_amd64.whl", b"wheel")]);
        assert!(matches!(
            install_wheel(&archive, "cp312-cp312", &installer),
            State::Retry
        ));

        let wheel = installed.lock().unwrap().clone().unwrap();
        assert!(wheel.ends_with("dist/lief-1.2.3-cp312-cp312-win_amd64.whl"));
        assert!(!wheel.exists());
    }
}
