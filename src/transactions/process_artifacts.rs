use std::collections::HashSet;

use tracing::{error, info};

use crate::{
    env::BootstrapConfig,
    framework::State,
    python::PackageInstaller,
    transactions::{fetch_artifacts, install_sdk, install_wheel},
    unwrap,
    workflow::{
        CiClient, WorkflowRun,
        artifact::{ArtifactKind, human_size},
    },
};

/// Downloads and installs the artifacts of `run`.
///
/// Every artifact name is checked before anything is downloaded: an unknown artifact stops the
/// pipeline. The SDK and the wheel must both be installed for the run to succeed, a run missing
/// one of them is retried as its uploads may not be complete yet.
pub fn process_artifacts<C, P>(
    client: &C,
    run: &WorkflowRun,
    config: &BootstrapConfig,
    installer: &P,
) -> State<()>
where
    C: CiClient + ?Sized,
    P: PackageInstaller + ?Sized,
{
    let artifacts = unwrap!(fetch_artifacts(client, &run.artifacts_url));

    let mut classified = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        info!(
            "{:<30} ({}): {}",
            artifact.name,
            human_size(artifact.size_in_bytes),
            artifact.archive_download_url
        );
        match config.artifacts.kind_of(&artifact.name) {
            Ok(kind) => classified.push((kind, artifact)),
            Err(err) => {
                error!("{err}");
                return State::Stop(err);
            }
        }
    }

    let abi_tag = config.python_version.abi_tag();
    let mut installed = HashSet::new();
    for (kind, artifact) in classified {
        info!(
            "downloading {kind} {} ({})…",
            artifact.name,
            human_size(artifact.size_in_bytes)
        );
        let archive = unwrap!(client.download(&artifact.archive_download_url));
        match kind {
            ArtifactKind::Sdk => unwrap!(install_sdk(&archive, &config.output_dir)),
            ArtifactKind::Wheel => unwrap!(install_wheel(&archive, &abi_tag, installer)),
        }
        installed.insert(kind);
    }

    let missing: Vec<_> = [
        (ArtifactKind::Sdk, &config.artifacts.sdk),
        (ArtifactKind::Wheel, &config.artifacts.wheel),
    ]
    .into_iter()
    .filter(|(kind, _)| !installed.contains(kind))
    .map(|(_, name)| name.as_str())
    .collect();

    if missing.is_empty() {
        State::Success(())
    } else {
        error!("artifacts missing from {run}: {}", missing.join(", "));
        State::Retry
    }
}
