use crate::Error;

/// A state that controls the flow of data.
#[non_exhaustive]
#[derive(Debug)]
pub enum State<T> {
    /// The control flow should continue with a value.
    Success(T),
    /// The step failed on a condition that may resolve itself, the control flow should retry if
    /// possible.
    ///
    /// See: [`RetryBudget::retry_if_possible`](super::RetryBudget::retry_if_possible)
    Retry,
    /// The control flow should exit immediately with an error.
    Stop(Error),
}

impl<T> State<T> {
    /// Maps the value if [`self`] is [`State::Success`].
    pub fn map<F, R>(self, f: F) -> State<R>
    where
        F: FnOnce(T) -> R,
    {
        match self {
            Self::Success(value) => State::Success(f(value)),
            Self::Retry => State::Retry,
            Self::Stop(err) => State::Stop(err),
        }
    }

    /// Converts [`self`] into an [`Option`], discarding the reason of a failure.
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Retry | Self::Stop(_) => None,
        }
    }

    /// Splits the value of a [`State::Success`] from the states that end the control flow, the
    /// latter converted for a caller producing another type.
    ///
    /// # Errors
    ///
    /// Returns the [`State::Retry`] or [`State::Stop`] as an [`Err`].
    pub fn into_result<R>(self) -> Result<T, State<R>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Retry => Err(State::Retry),
            Self::Stop(err) => Err(State::Stop(err)),
        }
    }

    /// Returns `true` if [`self`] is [`State::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T> From<Error> for State<T> {
    fn from(err: Error) -> Self {
        Self::Stop(err)
    }
}

/// Unwraps a [`State::Success`], or returns early from the enclosing function with the
/// [`State::Retry`] or [`State::Stop`].
///
/// # Examples
///
/// ```rust
/// use lief_ci::{framework::State, unwrap};
///
/// fn greet() -> State<String> {
///     State::Success(String::from("42!"))
/// }
///
/// fn transaction() -> State<()> {
///     let greeting = unwrap!(greet());
///     assert_eq!(greeting, "42!");
///     State::Success(())
/// }
///
/// assert!(transaction().is_success());
/// ```
#[macro_export]
macro_rules! unwrap {
    ($state:expr) => {
        match $crate::framework::State::into_result($state) {
            ::core::result::Result::Ok(value) => value,
            ::core::result::Result::Err(state) => return state,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve(value: u32) -> State<u32> {
        if value % 2 == 0 {
            State::Success(value / 2)
        } else {
            State::Retry
        }
    }

    fn quarter(value: u32) -> State<u32> {
        let half = crate::unwrap!(halve(value));
        halve(half)
    }

    #[test]
    fn unwrap_returns_early() {
        assert!(matches!(quarter(8), State::Success(2)));
        assert!(matches!(quarter(6), State::Retry));
        assert!(matches!(quarter(7), State::Retry));
    }

    #[test]
    fn stop_carries_the_error() {
        let state: State<()> = Error::UnknownArtifact("nope".to_owned()).into();
        match state.map(|()| 1) {
            State::Stop(Error::UnknownArtifact(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected state {other:?}"),
        }
    }
}
