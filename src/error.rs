//! The error kinds reported by both pipelines.

use thiserror::Error;

/// A [`Result`](std::result::Result) defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that end a pipeline.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A run published an artifact whose name matches none of the expected artifacts.
    #[error("unknown artifact `{0}`")]
    UnknownArtifact(String),

    /// No successful run of the workflow was found on the branch before the retry budget ran out.
    #[error("did not find a successful run of workflow `{workflow}` on branch `{branch}`")]
    WorkflowNotFound {
        /// The display name of the workflow.
        workflow: String,
        /// The branch the run was looked up on.
        branch: String,
    },

    /// The artifacts of a run could not all be installed before the retry budget ran out.
    #[error("failed to install the artifacts of workflow `{workflow}` on branch `{branch}`")]
    ArtifactsNotInstalled {
        /// The display name of the workflow.
        workflow: String,
        /// The branch the run was looked up on.
        branch: String,
    },

    /// A subprocess exited unsuccessfully.
    #[error("`{command}` failed: {status}")]
    Subprocess {
        /// The command line that was run.
        command: String,
        /// The exit status, as reported by the operating system.
        status: String,
    },

    /// `ssh-agent` printed something that does not look like its environment.
    #[error("can't start ssh-agent: unexpected output {0:?}")]
    AgentOutput(String),

    /// The documentation push was rejected on every attempt.
    #[error("push to {remote} rejected {attempts} times")]
    PushRejected {
        /// The remote pushed to.
        remote: String,
        /// How many pushes were attempted.
        attempts: u8,
    },

    /// An I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other unexpected failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
