#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Endpoint rule compiler.
//!
//! An endpoint document maps each service name (plus the reserved
//! `_default` bucket) to an ordered list of rules. A rule carries a URI
//! template and a list of constraints on the service and region; the first
//! rule whose constraints all hold wins. [`Endpoints::render`] compiles the
//! rules into a `lookup(service, region)` function, [`Endpoints::resolve`]
//! evaluates them in-process.

pub mod render;
pub mod rules;

use normalization::FormatError;
use thiserror::Error;

pub use rules::{
    Constraint, CredentialScope, Endpoint, Endpoints, Field, Operand, Operator, Properties,
    ResolvedEndpoint, DEFAULT_BUCKET,
};

/// Errors raised while parsing or compiling endpoint rules.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The rule document could not be read or the output could not be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The rule document is malformed.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
    /// The compiled lookup did not parse as Rust.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Building the lookup text failed.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

/// Result alias for endpoint operations.
pub type Result<T> = std::result::Result<T, EndpointError>;
