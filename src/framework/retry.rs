use std::time::Duration;

use tracing::{error, warn};

#[cfg(test)]
use mockall::automock;

/// How long to wait before looking for a workflow run again.
pub const RUN_RETRY_DELAY: Duration = Duration::from_secs(2);

/// How long to wait before processing the artifacts of a run again. Uploads take longer to settle
/// than run listings.
pub const ARTIFACT_RETRY_DELAY: Duration = Duration::from_secs(6);

/// The default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u8 = 4;

/// Blocks the current thread between two attempts.
#[cfg_attr(test, automock)]
pub trait Sleep {
    /// Sleeps for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// The retry limits of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How many times a failed attempt may be retried.
    pub retries: u8,
    /// The delay after a workflow run was not found.
    pub run_delay: Duration,
    /// The delay after the artifacts of a run failed to install.
    pub artifact_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES)
    }
}

impl RetryPolicy {
    /// Creates a [`RetryPolicy`] with the given retry budget and the default delays.
    pub const fn new(retries: u8) -> Self {
        Self {
            retries,
            run_delay: RUN_RETRY_DELAY,
            artifact_delay: ARTIFACT_RETRY_DELAY,
        }
    }

    /// Starts a fresh [`RetryBudget`] for one pipeline invocation.
    pub const fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.retries)
    }
}

/// The retries left to a pipeline invocation, shared by every retry loop of the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    attempts_remaining: u8,
    retried: u8,
}

impl RetryBudget {
    /// Creates a [`RetryBudget`] allowing `retries` retries.
    pub const fn new(retries: u8) -> Self {
        Self {
            attempts_remaining: retries,
            retried: 0,
        }
    }

    /// The number of retries still allowed.
    pub const fn attempts_remaining(&self) -> u8 {
        self.attempts_remaining
    }

    /// The number of retries consumed so far.
    pub const fn retried(&self) -> u8 {
        self.retried
    }

    /// Decides whether retrying is allowed, consuming one retry if so, then sleeps for `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`Err<()>`] without sleeping if the budget is exhausted.
    pub fn retry_if_possible<S>(&mut self, delay: Duration, sleep: &S) -> Result<(), ()>
    where
        S: Sleep + ?Sized,
    {
        if self.attempts_remaining == 0 {
            error!("retried for too many times ({}), stopping!", self.retried);
            return Err(());
        }

        self.attempts_remaining -= 1;
        self.retried += 1;
        warn!(
            "retrying in {}s… ({} / {})",
            delay.as_secs(),
            self.retried,
            self.retried + self.attempts_remaining
        );
        sleep.sleep(delay);
        Ok(())
    }
}
