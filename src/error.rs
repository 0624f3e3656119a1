//! Error types for the scene replay engine.

use crate::types::StreamId;
use std::path::PathBuf;
use thiserror::Error;

/// Raised by a loader when the source material is malformed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Unknown stream {0} referenced by access unit")]
    UnknownStream(StreamId),

    #[error("Source is not valid UTF-8")]
    Encoding,

    #[error("Source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised by the host interpreter when a single command fails against the graph.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Command '{op}' rejected: {reason}")]
    Rejected { op: String, reason: String },

    #[error("Target node not found: {0}")]
    NodeNotFound(String),
}

/// Raised by the host when a subtitle import cannot be performed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Subtitle import not supported by this host")]
    Unsupported,

    #[error("Subtitle source unreadable: {0}")]
    Unreadable(String),
}

/// Engine-level errors reported from `Engine::tick` and setup calls.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Command application failed: {0}")]
    Apply(#[from] ApplyError),

    #[error("Bad parameter: {0}")]
    BadParameter(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Non-compliant stream {0}")]
    NonCompliantStream(StreamId),

    #[error("Cannot open source {path:?}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}
