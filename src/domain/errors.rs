//! Domain error types
//!
//! These errors are framework-agnostic and represent pipeline-level failures.
//! Row-level validation problems are not errors in this sense; they travel
//! through the cleaning report instead.

use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// A required column is absent from the input table
    MissingColumn(String),
    /// File system error while reading input or writing output
    Io(String),
    /// CSV could not be read or written
    Csv(String),
    /// XML catalogue could not be parsed
    Xml(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingColumn(name) => {
                write!(f, "Required column missing: {}", name)
            }
            PipelineError::Io(msg) => write!(f, "I/O error: {}", msg),
            PipelineError::Csv(msg) => write!(f, "CSV error: {}", msg),
            PipelineError::Xml(msg) => write!(f, "XML error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Io(e.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        PipelineError::Csv(e.to_string())
    }
}
