use tracing::{error, info};

use crate::{
    Error, Result,
    env::BootstrapConfig,
    framework::{Sleep, State},
    python::PackageInstaller,
    transactions::process_artifacts,
    workflow::{CiClient, resolve_workflow},
};

/// Installs the artifacts of the latest successful run of the configured workflow and branch.
///
/// Each attempt resolves the run and processes all its artifacts from scratch. A run that is not
/// visible yet is looked up again after [`RetryPolicy::run_delay`], a run whose artifacts failed
/// to install after [`RetryPolicy::artifact_delay`]. Both consume the same budget.
///
/// [`RetryPolicy::run_delay`]: crate::framework::RetryPolicy::run_delay
/// [`RetryPolicy::artifact_delay`]: crate::framework::RetryPolicy::artifact_delay
///
/// # Errors
///
/// Returns [`Error::WorkflowNotFound`] or [`Error::ArtifactsNotInstalled`] once the budget is
/// exhausted, naming the condition of the last attempt, or the error of an attempt that can't be
/// retried, such as [`Error::UnknownArtifact`].
pub fn bootstrap<C, P, S>(
    client: &C,
    installer: &P,
    sleep: &S,
    config: &BootstrapConfig,
) -> Result<()>
where
    C: CiClient + ?Sized,
    P: PackageInstaller + ?Sized,
    S: Sleep + ?Sized,
{
    info!(
        "bootstrapping LIEF from workflow {} on {}…",
        config.workflow, config.branch
    );

    let mut budget = config.retry.budget();
    loop {
        let (delay, unmet) = match resolve_workflow(client, &config.branch, &config.workflow) {
            None => {
                error!(
                    "workflow '{}' not found, {} retries left",
                    config.workflow,
                    budget.attempts_remaining()
                );
                (
                    config.retry.run_delay,
                    Error::WorkflowNotFound {
                        workflow: config.workflow.clone(),
                        branch: config.branch.clone(),
                    },
                )
            }
            Some(run) => match process_artifacts(client, &run, config, installer) {
                State::Success(()) => {
                    info!("LIEF SDK and Python wheel installed from {run}");
                    return Ok(());
                }
                State::Retry => {
                    error!(
                        "failed to install the artifacts of {run}, {} retries left",
                        budget.attempts_remaining()
                    );
                    (
                        config.retry.artifact_delay,
                        Error::ArtifactsNotInstalled {
                            workflow: config.workflow.clone(),
                            branch: config.branch.clone(),
                        },
                    )
                }
                State::Stop(err) => return Err(err),
            },
        };

        if budget.retry_if_possible(delay, sleep).is_err() {
            error!("{unmet}");
            return Err(unmet);
        }
    }
}
