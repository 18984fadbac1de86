//! Error types for definition loading and save data.
//!
//! Runtime quest and reputation operations do not fail; a missing quest or
//! reputation is a silent no-op. Only loading and persistence report errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading declarative definition files.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A file or directory could not be read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A whole document was not valid TOML.
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    /// A single entry was readable but unusable.
    #[error("invalid {kind} '{name}': {reason}")]
    InvalidEntry {
        kind: &'static str,
        name: String,
        reason: String,
    },
}

impl DefinitionError {
    pub fn invalid(kind: &'static str, name: impl Into<String>, reason: impl Into<String>) -> Self {
        DefinitionError::InvalidEntry {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading or writing save data.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("save serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
