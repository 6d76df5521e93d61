//! Data models of GitHub Actions workflows and the lookup of the run to bootstrap from.

#![cfg(feature = "bootstrap")]

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::framework::State;

pub mod artifact;
pub mod client;

pub use client::{CiClient, GitHubClient};

/// The conclusion of a workflow run that produced usable artifacts.
pub const SUCCESS: &str = "success";

/// Represents workflow runs from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowRuns {
    /// The total number of runs, possibly more than returned in this page.
    #[serde(default)]
    pub total_count: u64,
    /// The runs in this page.
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Represents a GitHub Actions workflow run from GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// The run id.
    #[serde(default)]
    pub id: u64,
    /// The display name of the workflow, [`None`] for some runs not triggered by a workflow file.
    pub name: Option<String>,
    /// The branch the run was triggered on, [`None`] once its head ref is gone.
    pub head_branch: Option<String>,
    /// The outcome of the run, [`None`] while it is in progress.
    pub conclusion: Option<String>,
    /// The last time the run changed.
    pub updated_at: DateTime<Utc>,
    /// The endpoint listing the artifacts of the run.
    pub artifacts_url: String,
}

impl WorkflowRun {
    /// Whether the run succeeded on `branch`.
    pub fn is_success_on(&self, branch: &str) -> bool {
        self.head_branch.as_deref() == Some(branch) && self.conclusion.as_deref() == Some(SUCCESS)
    }

    /// Whether the run belongs to the workflow named `workflow`.
    pub fn is_named(&self, workflow: &str) -> bool {
        self.name.as_deref() == Some(workflow)
    }
}

impl Display for WorkflowRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} on {})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.id,
            self.head_branch.as_deref().unwrap_or("<no branch>")
        )
    }
}

/// Keeps the successful runs of `branch`, most recently updated first.
pub fn successful_runs(runs: Vec<WorkflowRun>, branch: &str) -> Vec<WorkflowRun> {
    let mut runs: Vec<_> = runs
        .into_iter()
        .filter(|run| run.is_success_on(branch))
        .collect();
    runs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    runs
}

/// Looks for the most recently updated successful run of `workflow` on `branch`.
///
/// A failed listing counts as no run at all, so that the caller can retry the lookup.
pub fn resolve_workflow<C>(client: &C, branch: &str, workflow: &str) -> Option<WorkflowRun>
where
    C: CiClient + ?Sized,
{
    debug!("looking for workflow {workflow} on {branch}…");

    let runs = match client.list_runs() {
        State::Success(runs) => runs,
        State::Retry | State::Stop(_) => {
            warn!("failed to list workflow runs, treating as not found");
            return None;
        }
    };

    let found = successful_runs(runs, branch).into_iter().find(|run| {
        info!(
            "{:<30}: {}",
            run.name.as_deref().unwrap_or_default(),
            run.artifacts_url
        );
        run.is_named(workflow)
    });

    match &found {
        Some(run) => info!("found workflow run {run} updated at {}", run.updated_at),
        None => warn!("workflow {workflow} not found on {branch}"),
    }
    found
}
