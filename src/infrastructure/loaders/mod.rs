//! Directory loaders for commands and events
//!
//! Each `.yaml`/`.yml` file in a directory is a manifest naming a handler
//! registered in a [`HandlerCatalog`]. Files that fail to parse or validate
//! are logged and skipped; the rest of the directory still loads.

pub mod catalog;
pub mod commands;
pub mod events;
pub mod manifest;

pub use catalog::HandlerCatalog;
pub use commands::FileBasedCommands;
pub use events::FileBasedEvents;
pub use manifest::{CommandManifest, EventManifest};

use std::path::{Path, PathBuf};

use crate::application::errors::LoadError;

/// A manifest the loader rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl LoadFailure {
    fn new(path: PathBuf, error: &LoadError) -> Self {
        Self {
            path,
            reason: error.to_string(),
        }
    }
}

/// Manifest files directly inside `dir`, in file-name order
fn scan(dir: &Path, kind: &'static str) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.exists() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
            kind,
        });
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        // Skip hidden files
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        let is_manifest = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if !is_manifest {
            tracing::debug!("Skipping non-manifest file {}", path.display());
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}
