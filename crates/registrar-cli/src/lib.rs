//! Registrar CLI library.
//!
//! This library provides the core functionality for the `registrar` command,
//! including configuration layering, the chunk-by-chunk pipeline driver, and
//! report formatting.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub use cli::{Cli, Command};
pub use config::{Config, Overrides};
pub use error::{CliError, Result};
pub use output::Formatter;
pub use pipeline::{ChunkOutcome, ChunkReport, Pipeline, RunReport, Summary};
