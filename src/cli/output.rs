//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::EngineError;

/// Map engine errors to a one-line message for CLI output.
pub fn map_error(e: &EngineError) -> String {
    match e {
        EngineError::Parse(inner) => format!("invalid timeline: {}", inner),
        EngineError::Source { path, source } => {
            format!("cannot read {}: {}", path.display(), source)
        }
        other => other.to_string(),
    }
}
