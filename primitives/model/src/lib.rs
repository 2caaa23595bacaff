#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Service model for apigen.
//!
//! A [`Service`] is decoded from a service-description document and owns every
//! [`Shape`] in a flat name-keyed registry. Shapes never embed each other:
//! members, list elements and map keys/values are [`ShapeRef`]s that hold only
//! a name and are resolved through [`Service::resolve`] when read. That keeps
//! self- and mutually-referential shapes representable without ownership
//! cycles, and every walk over the graph terminates.

mod raw;
pub mod service;
pub mod shape;
pub mod types;

use thiserror::Error;

pub use service::{HttpBinding, Metadata, Operation, Service};
pub use shape::{ErrorInfo, Member, Shape, ShapeKind, ShapeRef, StructureShape};
pub use types::RustType;

/// Errors raised while loading or resolving a service model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The description document could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The description document is malformed or has mismatched field types.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
    /// A shape reference names a shape that does not exist.
    #[error("{referrer}: undefined shape `{target}`")]
    DanglingShapeRef {
        /// Where the reference was found, e.g. `operation DeleteTrail input`.
        referrer: String,
        /// The missing shape name.
        target: String,
    },
    /// A shape declares a kind outside the supported set.
    #[error("shape `{shape}` has unsupported type `{kind}`")]
    UnknownShapeKind {
        /// Shape name.
        shape: String,
        /// The declared kind.
        kind: String,
    },
    /// A list or map shape is missing one of its element references.
    #[error("{kind} shape `{shape}` has no `{role}` reference")]
    MissingElementRef {
        /// Shape name.
        shape: String,
        /// `list` or `map`.
        kind: &'static str,
        /// `member`, `key` or `value`.
        role: &'static str,
    },
    /// Lists and maps nest back into themselves without passing through a
    /// structure, so no finite type exists.
    #[error("shape `{shape}` expands into itself without an intervening structure")]
    UnboundedType {
        /// Shape name where the cycle was detected.
        shape: String,
    },
}

/// Result alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
