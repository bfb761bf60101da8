//! Error types for docstamp.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while stamping a file.
#[derive(Error, Debug)]
pub enum StampError {
    /// The source could not be parsed into a tree. The engine never runs.
    #[error("failed to parse '{}': {}", .path.display(), .reason)]
    Parse { path: PathBuf, reason: String },

    /// The template does not take exactly one name argument.
    #[error("invalid template {template:?}: {reason}")]
    Template { template: String, reason: String },

    #[error("failed to read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StampError {
    pub fn parse(path: &Path, reason: impl Into<String>) -> Self {
        StampError::Parse {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn template(template: &str, reason: impl Into<String>) -> Self {
        StampError::Template {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StampError>;
