#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns description documents into client
//! modules on disk.
//!
//! ## Module Organization
//!
//! - `orchestration` - Entry points (`generate_service`, `generate_endpoints`, `run_all`)
//! - `output` - Atomic file output

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the codegen pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A service description failed to load or resolve.
    #[error("{service}: {source}")]
    Model {
        /// Service being generated.
        service: String,
        /// Underlying model error.
        #[source]
        source: model::ModelError,
    },
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Error propagated from the endpoint rule compiler.
    #[error(transparent)]
    Endpoints(#[from] endpoints::EndpointError),
    /// Error loading the batch configuration.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// I/O error while creating or writing files.
    #[error("{}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

pub mod orchestration;
pub mod output;

pub use orchestration::{
    generate_endpoints, generate_service, render_endpoints, render_service, run_all, Summary,
};
pub use output::write_atomic;
