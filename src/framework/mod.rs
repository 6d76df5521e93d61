//! The control flow shared by the pipelines: a [`State`] returned by every step, and a bounded
//! [`RetryBudget`] consumed by the loops that drive them.

mod retry;
mod state;

pub use retry::*;
pub use state::*;
