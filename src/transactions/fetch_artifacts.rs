use tracing::{debug, warn};

use crate::{
    framework::State,
    workflow::{CiClient, artifact::Artifact},
};

/// Fetches the artifacts of a workflow run at `url`, leaving out the expired ones.
pub fn fetch_artifacts<C>(client: &C, url: &str) -> State<Vec<Artifact>>
where
    C: CiClient + ?Sized,
{
    client.list_artifacts(url).map(|artifacts| {
        artifacts
            .into_iter()
            .filter(|artifact| {
                if artifact.expired {
                    warn!("skipping expired artifact {artifact}");
                } else {
                    debug!("{artifact}");
                }
                !artifact.expired
            })
            .collect()
    })
}
