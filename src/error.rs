// src/error.rs

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a run. None of these are retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input row (or header) does not conform to the fixed schema.
    #[error("schema mismatch in {}: {message}", .path.display())]
    SchemaMismatch { path: PathBuf, message: String },

    #[error("cannot read input {}: {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output path could not be created or written.
    #[error("cannot write output {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine failed to start: {0}")]
    EngineInitialization(String),

    /// Failure inside a query (missing column, type mismatch, ...).
    #[error("engine error: {0}")]
    Engine(#[from] PolarsError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn schema_mismatch(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PipelineError::SchemaMismatch {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::IoWrite {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
