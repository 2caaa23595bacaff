#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
//! Command-line front end for apigen.
//!
//! [`Cli`] describes the arguments, [`run`] installs logging and executes a
//! parsed command line.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use codegen::{GeneratorOptions, DEFAULT_RUNTIME_CRATE};
use config::{Config, ConfigError};
use endpoints::{EndpointError, Endpoints};
use logging::LoggingError;
use pipeline::PipelineError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A generation step failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// The batch configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The endpoint rule document could not be read.
    #[error(transparent)]
    Endpoints(#[from] EndpointError),
    /// Logging could not be set up.
    #[error(transparent)]
    Logging(#[from] LoggingError),
    /// Writing to stdout or reading an input failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File involved, `-` for stdout.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// No rule matched the service and region.
    #[error("no endpoint for service {service} in region {region}")]
    NoEndpoint {
        /// Service name looked up.
        service: String,
        /// Region looked up.
        region: String,
    },
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Command-line interface configuration.
#[derive(Parser, Debug)]
#[command(name = "apigen", about = "Generates Rust API clients from service descriptions", version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Log level or filter directive; overrides the configuration file
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Available commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Generate the client module for one service description
    Service {
        /// Client type name, e.g. CloudTrail
        name: String,
        /// Service description document
        input: PathBuf,
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Runtime crate path referenced by the generated client
        #[arg(long, default_value = DEFAULT_RUNTIME_CRATE)]
        runtime_crate: String,
    },
    /// Compile an endpoint rule document into a lookup module
    Endpoints {
        /// Endpoint rule document
        input: PathBuf,
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve one service and region against an endpoint rule document
    Lookup {
        /// Endpoint rule document
        input: PathBuf,
        /// Service name, e.g. sqs
        service: String,
        /// Region name, e.g. us-west-2
        region: String,
    },
    /// Run every job listed in a configuration file
    Batch {
        /// Configuration file; defaults to the user config directory
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Installs logging and executes `cli`, writing command output to stdout.
///
/// For `batch` the configuration is loaded first so its `logging.level` can
/// seed the filter; `--log-level`, `-v` and `RUST_LOG` take precedence.
pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.command {
        Command::Batch { config } => Some(Config::load(config.as_deref())?),
        _ => None,
    };

    let configured = cli
        .log_level
        .as_deref()
        .or(config.as_ref().map(|c| c.logging.level.as_str()))
        .unwrap_or(logging::DEFAULT_LEVEL);
    logging::init(&logging::filter_directive(configured, cli.verbose))?;
    tracing::debug!(command = ?cli.command, "starting");

    match config {
        Some(config) => batch(&config, &mut std::io::stdout().lock()),
        None => execute(cli.command, &mut std::io::stdout().lock()),
    }
}

/// Executes one command without touching global logging state.
///
/// Generated source and lookup results go to `stdout`.
pub fn execute<W: Write>(command: Command, stdout: &mut W) -> Result<()> {
    match command {
        Command::Service { name, input, output, runtime_crate } => {
            let options = GeneratorOptions { runtime_crate };
            match output {
                Some(output) => pipeline::generate_service(&name, &input, &output, &options)?,
                None => emit(stdout, &pipeline::render_service(&name, &input, &options)?)?,
            }
        }
        Command::Endpoints { input, output } => match output {
            Some(output) => pipeline::generate_endpoints(&input, &output)?,
            None => emit(stdout, &pipeline::render_endpoints(&input)?)?,
        },
        Command::Lookup { input, service, region } => {
            let rules = load_rules(&input)?;
            let resolved = rules
                .resolve(&service, &region)
                .ok_or(CliError::NoEndpoint { service, region })?;
            emit(stdout, format!("{resolved}\n").as_bytes())?;
        }
        Command::Batch { config } => {
            let config = Config::load(config.as_deref())?;
            batch(&config, stdout)?;
        }
    }
    Ok(())
}

fn batch<W: Write>(config: &Config, stdout: &mut W) -> Result<()> {
    let summary = pipeline::run_all(config)?;
    let mut report = String::new();
    for path in summary.endpoints.iter().chain(&summary.services) {
        report.push_str(&format!("wrote {}\n", path.display()));
    }
    emit(stdout, report.as_bytes())
}

fn load_rules(input: &Path) -> Result<Endpoints> {
    let file =
        File::open(input).map_err(|source| CliError::Io { path: input.to_path_buf(), source })?;
    Ok(Endpoints::parse(BufReader::new(file))?)
}

fn emit<W: Write>(stdout: &mut W, bytes: &[u8]) -> Result<()> {
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|source| CliError::Io { path: PathBuf::from("-"), source })
}
