//! Error types shared by the parsers and tools.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Sequence parsing error: {0}")]
    Sequence(#[from] needletail::errors::ParseError),

    #[error("GenBank error: {0}")]
    GenBank(String),

    #[error("Malformed {format} record at line {line}: {reason}")]
    Malformed {
        format: &'static str,
        line: u64,
        reason: String,
    },

    #[error("Missing field '{field}' in {context}")]
    MissingField { field: String, context: String },

    #[error("'{id}' not found in {source_name}")]
    NotFound { id: String, source_name: String },

    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Statistics error: {0}")]
    Statistics(String),
}

impl ToolError {
    pub fn malformed(format: &'static str, line: u64, reason: impl Into<String>) -> Self {
        ToolError::Malformed {
            format,
            line,
            reason: reason.into(),
        }
    }

    pub fn missing(field: impl Into<String>, context: impl Into<String>) -> Self {
        ToolError::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn not_found(id: impl Into<String>, source_name: impl Into<String>) -> Self {
        ToolError::NotFound {
            id: id.into(),
            source_name: source_name.into(),
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
