//! Error types for the tools around the compiler
//!
//! The front end itself never fails: problems in schema text are
//! [`Diagnostics`]. `CarchError` covers the edges that touch the outside
//! world (reading sources, loading configuration, writing reports).

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, CarchError>;

#[derive(Error, Debug)]
pub enum CarchError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a schema source: {} (expected a .carch file or a directory)", .0.display())]
    NotASource(PathBuf),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{} failed with {} error(s)", path.display(), diagnostics.len())]
    Compile { path: PathBuf, diagnostics: Diagnostics },

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
