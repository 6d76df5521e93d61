//! Continuous integration helpers for LIEF.
//!
//! Two pipelines live here:
//!
//! - the bootstrap pipeline, which resolves the latest successful workflow run of a branch and
//!   installs its SDK and Python wheel artifacts (see [`transactions::bootstrap`]);
//! - the documentation publisher, which pushes freshly built documentation to the website
//!   repository (see [`publish::publish`]).

pub mod command;
pub mod env;
pub mod error;
pub mod framework;
pub mod logging;
pub mod publish;
pub mod python;
pub mod transactions;
pub mod workflow;

pub use error::{Error, Result};

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// use lief_ci::static_lazy_lock;
///
/// static_lazy_lock! {
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: std::sync::LazyLock<String> =
///     std::sync::LazyLock::new(|| String::from("a static variable"));
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
