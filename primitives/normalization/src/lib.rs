#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Text normalization shared by the apigen compilers.
//!
//! Three concerns live here because both the client emitter and the endpoint
//! rule compiler need them:
//!
//! - [`ident`]: turning raw service-description names into Rust identifiers
//!   (`exportable`, `snake_case`).
//! - [`doc`]: turning HTML-ish documentation fragments into `///` comments.
//! - [`source`]: the canonical formatter every emitted file passes through.

pub mod doc;
pub mod ident;
pub mod source;

pub use doc::{godoc, LINE_WIDTH};
pub use ident::{exportable, snake_case};
pub use source::{format_rust, FormatError, GENERATED_HEADER};
