//! Error types for the enrichment pipeline.
//!
//! Errors are classified by blast radius:
//! - Fatal: configuration problems (missing credential, missing or empty
//!   input) and file-level I/O failures abort before/instead of producing
//!   output.
//! - Degradable: transport and decode failures affect a single batch or
//!   record; the call site substitutes an empty result and the run continues.

use std::path::PathBuf;

use thiserror::Error;

/// Error types for pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    // Fatal: nothing has been processed yet, or output cannot be produced
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Input table has no rows: {0}")]
    EmptyInput(PathBuf),

    #[error("Table error: {0}")]
    Table(String),

    #[error("IO error: {0}")]
    Io(String),

    // Degradable: affects one unit of work
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl PipelineError {
    /// Returns true if this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PipelineError::Transport(_) | PipelineError::Decode(_)
        )
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_decode_are_degradable() {
        assert!(!PipelineError::Transport("timeout".into()).is_fatal());
        assert!(!PipelineError::Decode("not json".into()).is_fatal());
    }

    #[test]
    fn configuration_is_fatal() {
        assert!(PipelineError::Configuration("no key".into()).is_fatal());
        assert!(PipelineError::InputNotFound(PathBuf::from("x.csv")).is_fatal());
        assert!(PipelineError::EmptyInput(PathBuf::from("x.csv")).is_fatal());
    }
}
