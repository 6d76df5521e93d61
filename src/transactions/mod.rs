//! The steps of the bootstrap pipeline, from listing the artifacts of a run to installing them,
//! and the retry loop driving them.

#![cfg(feature = "bootstrap")]

mod bootstrap;
mod extract_archive;
mod fetch_artifacts;
mod install_sdk;
mod install_wheel;
mod process_artifacts;

pub use bootstrap::*;
pub use extract_archive::*;
pub use fetch_artifacts::*;
pub use install_sdk::*;
pub use install_wheel::*;
pub use process_artifacts::*;
