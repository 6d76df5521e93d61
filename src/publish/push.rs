use tracing::{info, warn};

use crate::{
    Result,
    command::{Invocation, Shell},
    env::PublishConfig,
    publish::SshAgent,
};

/// How a bounded push ended.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The push was accepted.
    Pushed {
        /// The number of pushes, the accepted one included.
        attempts: u8,
    },
    /// Every push was rejected.
    Exhausted {
        /// The number of rejected pushes.
        attempts: u8,
    },
}

/// Force-pushes the website repository, rebasing onto the remote branch after every rejection.
///
/// Rejections are not errors: the caller decides what an [`PushOutcome::Exhausted`] push means.
///
/// # Errors
///
/// Returns an error only if `git` can't be run at all.
pub fn push_with_retry<S>(
    config: &PublishConfig,
    shell: &S,
    agent: &SshAgent,
) -> Result<PushOutcome>
where
    S: Shell + ?Sized,
{
    let git = || {
        Invocation::new("git")
            .current_dir(&config.website_dir)
            .envs(agent.envs())
    };

    for attempt in 1..=config.push_attempts {
        let push = git().args([
            "push",
            "--force",
            config.website_ssh_repo.as_str(),
            config.website_branch.as_str(),
        ]);
        if shell.status(&push)?.success() {
            info!(
                "pushed to {} ({attempt} / {})",
                config.website_ssh_repo, config.push_attempts
            );
            return Ok(PushOutcome::Pushed { attempts: attempt });
        }

        warn!(
            "push to {} rejected ({attempt} / {}), rebasing onto the remote…",
            config.website_ssh_repo, config.push_attempts
        );
        // exit codes of the rebase cycle are not checked
        for args in [
            vec!["branch", "-a", "-v"],
            vec!["fetch", "-v", "origin", config.website_branch.as_str()],
            vec!["branch", "-a", "-v"],
            vec!["rebase", "-s", "recursive", "-X", "theirs", "FETCH_HEAD"],
            vec!["branch", "-a", "-v"],
        ] {
            shell.status(&git().args(args))?;
        }
    }

    Ok(PushOutcome::Exhausted {
        attempts: config.push_attempts,
    })
}
