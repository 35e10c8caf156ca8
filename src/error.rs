//! Errors raised at the crate's I/O boundaries
//!
//! The projection engine and the validation rules never fail; only loading
//! files (assumptions, parameters, fixtures) and decoding snapshots can.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown market assumption '{key}' in {path}")]
    UnknownKey { path: PathBuf, key: String },

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        LoadError::Csv { path: path.into(), source }
    }
}
