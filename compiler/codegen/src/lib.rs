#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Client code generation for service descriptions.
//!
//! This crate turns a loaded [`model::Service`] into a formatted Rust client
//! module: a client type with one method per operation and one serde struct
//! per request/response shape. Emission goes through three steps:
//!
//! - [`lower`]: model → declaration IR ([`ir`]),
//! - [`printer`]: IR → unformatted Rust text,
//! - `normalization::format_rust`: syntax check and canonical layout.
//!
//! Loading service descriptions and writing files reside in companion crates.

pub mod ir;
pub mod lower;
pub mod printer;
pub mod protocol;

use std::io::Write;

use model::{ModelError, Service};
use normalization::{format_rust, FormatError};
use thiserror::Error;

pub use crate::protocol::Protocol;

/// Runtime crate referenced by generated code unless configured otherwise.
pub const DEFAULT_RUNTIME_CRATE: &str = "aws";

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The service uses a protocol there is no template for.
    #[error("service {service} uses unsupported protocol `{protocol}`")]
    UnsupportedProtocol {
        /// Service name.
        service: String,
        /// The `metadata.protocol` value.
        protocol: String,
    },
    /// The model could not be resolved.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Building the source text failed.
    #[error("rendering failed: {source}")]
    Render {
        /// Underlying formatter error.
        #[source]
        source: std::fmt::Error,
        /// Text rendered before the failure.
        partial: String,
    },
    /// The rendered source is not valid Rust.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Writing the output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Path of the runtime crate generated code calls into.
    pub runtime_crate: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self { GeneratorOptions { runtime_crate: DEFAULT_RUNTIME_CRATE.to_string() } }
}

/// Generates the client module for `service` and writes it to `writer`.
///
/// The module is rendered and formatted in memory first. If formatting fails
/// the unformatted text is logged at error level, [`CodegenError::Format`] is
/// returned, and nothing reaches `writer`.
pub fn generate<W: Write>(service: &Service, writer: &mut W, options: &GeneratorOptions) -> Result<()> {
    let text = render(service, options)?;
    let formatted = format_rust(&text).map_err(|err| {
        let (line, column) = err.location();
        tracing::error!(
            service = %service.name,
            line,
            column,
            error = %err,
            text = %err.text,
            "generated client failed to format"
        );
        err
    })?;
    writer.write_all(formatted.as_bytes())?;
    tracing::debug!(service = %service.name, bytes = formatted.len(), "generated client");
    Ok(())
}

/// Renders the client module for `service` without formatting it.
pub fn render(service: &Service, options: &GeneratorOptions) -> Result<String> {
    let protocol = Protocol::from_name(&service.metadata.protocol).ok_or_else(|| {
        CodegenError::UnsupportedProtocol {
            service: service.name.clone(),
            protocol: service.metadata.protocol.clone(),
        }
    })?;

    let decl = lower::lower(service, protocol, options)?;
    let mut out = String::new();
    match printer::print(&decl, &mut out) {
        Ok(()) => Ok(out),
        Err(source) => Err(CodegenError::Render { source, partial: out }),
    }
}
