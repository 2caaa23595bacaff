// SPDX-License-Identifier: CC0-1.0

//! apigen umbrella crate.
//!
//! This crate primarily serves as the workspace root and re-exports the
//! member crates under one name. Functional code lives in the members under
//! `primitives` and `compiler`; the `apigen` binary lives in `cli`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(deprecated_in_future)]
#![doc(test(attr(warn(unused))))]

pub use {codegen, config, endpoints, model, normalization, pipeline};

/// Miscellaneous metadata about the apigen workspace.
pub mod apigen_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
