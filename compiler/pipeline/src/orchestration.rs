//! Pipeline orchestration for the main entry points.
//!
//! Each entry point loads one input document, renders it fully in memory, and
//! only then touches the output path, so a failed run never leaves a partial
//! file behind.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use codegen::GeneratorOptions;
use config::Config;
use endpoints::Endpoints;
use model::Service;

use crate::output::write_atomic;
use crate::{PipelineError, Result};

/// Files written by [`run_all`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Endpoint lookup module, if the configuration names one.
    pub endpoints: Option<PathBuf>,
    /// One client module per configured service, in configuration order.
    pub services: Vec<PathBuf>,
}

impl Summary {
    /// Total number of files written.
    pub fn len(&self) -> usize { self.services.len() + usize::from(self.endpoints.is_some()) }

    /// Whether nothing was written.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Loads, validates, and generates the client module for one service.
///
/// # Arguments
///
/// * `name` - Client type name, e.g. `CloudTrail`
/// * `input` - Path to the service description document
/// * `options` - Generator settings
///
/// # Returns
///
/// The formatted module source
pub fn render_service(name: &str, input: &Path, options: &GeneratorOptions) -> Result<Vec<u8>> {
    let model_err = |source| PipelineError::Model { service: name.to_string(), source };

    let service = Service::from_path(name, input).map_err(model_err)?;
    service.validate().map_err(model_err)?;
    tracing::debug!(
        service = name,
        operations = service.operations.len(),
        shapes = service.shapes.len(),
        protocol = %service.metadata.protocol,
        "loaded service description"
    );

    let mut out = Vec::new();
    codegen::generate(&service, &mut out, options)?;
    Ok(out)
}

/// Generates the client module for one service and writes it to `output`.
pub fn generate_service(
    name: &str,
    input: &Path,
    output: &Path,
    options: &GeneratorOptions,
) -> Result<()> {
    let source = render_service(name, input, options)?;
    write_atomic(output, &source)?;
    tracing::info!(service = name, output = %output.display(), "generated client");
    Ok(())
}

/// Parses an endpoint rule document and returns the formatted lookup module.
pub fn render_endpoints(input: &Path) -> Result<Vec<u8>> {
    let file = File::open(input)
        .map_err(|source| PipelineError::Io { path: input.to_path_buf(), source })?;
    let rules = Endpoints::parse(BufReader::new(file))?;
    tracing::debug!(services = rules.services().count(), "parsed endpoint rules");

    let mut out = Vec::new();
    rules.render(&mut out)?;
    Ok(out)
}

/// Compiles an endpoint rule document into a lookup module at `output`.
pub fn generate_endpoints(input: &Path, output: &Path) -> Result<()> {
    let source = render_endpoints(input)?;
    write_atomic(output, &source)?;
    tracing::info!(output = %output.display(), "generated endpoint lookup");
    Ok(())
}

/// Runs every generation job named by `config`.
///
/// The endpoint module is generated first, then each service in order. The
/// first failure stops the run.
///
/// # Returns
///
/// The paths of all files written
pub fn run_all(config: &Config) -> Result<Summary> {
    let options = GeneratorOptions { runtime_crate: config.codegen.runtime_crate.clone() };
    let mut summary = Summary::default();

    if let Some(job) = &config.endpoints {
        let output = config.output_path(&job.output);
        generate_endpoints(&job.input, &output)?;
        summary.endpoints = Some(output);
    }

    for job in &config.services {
        let output = config.output_path(&job.output_file());
        generate_service(&job.name, &job.input, &output, &options)?;
        summary.services.push(output);
    }

    if summary.is_empty() {
        tracing::warn!("configuration names no endpoints or services; nothing generated");
    } else {
        tracing::info!(files = summary.len(), "batch complete");
    }
    Ok(summary)
}
