//! Input discovery
//!
//! Expands command-line inputs into schema files: files are taken as given,
//! directories are walked recursively for `*.carch`.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CarchError, Result};

/// File extension of schema sources
pub const EXTENSION: &str = "carch";

/// Expand `inputs` into a list of schema files. Files found in a directory
/// are sorted; input order is otherwise kept.
pub fn collect(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input) {
                let entry = entry?;
                if entry.file_type().is_file() && is_schema_file(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        } else {
            return Err(CarchError::NotASource(input.clone()));
        }
    }
    Ok(files)
}

/// Read one schema file
pub fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CarchError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one schema file
pub fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| CarchError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn is_schema_file(path: &Path) -> bool {
    path.extension().map(|x| x == EXTENSION).unwrap_or(false)
}
