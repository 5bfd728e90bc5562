//! Error taxonomy shared by every tool in the crate.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing, unreadable or unwritable file
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML or JSON
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// Non-2xx response from the metadata API (404 on option sets excluded)
    #[error("request to {url} failed with status {status}: {body}")]
    Http {
        url: String,
        status: u16,
        body: String,
    },

    /// Connection failure or timeout
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Malformed or missing NTLM challenge
    #[error("NTLM authentication failed: {0}")]
    Auth(String),

    #[error("entity '{0}' has no localized display labels")]
    EmptyLabels(String),

    /// A required key is missing from a metadata record or input file
    #[error("missing required field '{field}' in {context}")]
    Validation { field: String, context: String },
}

impl ToolError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        ToolError::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, context: impl Into<String>) -> Self {
        ToolError::Validation {
            field: field.into(),
            context: context.into(),
        }
    }
}
