//! Handler manifest definitions

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::application::errors::LoadError;
use crate::domain::entities::CommandData;

/// A command manifest: the command's description payload plus the catalog
/// key of its execute callback
#[derive(Debug, Clone, Deserialize)]
pub struct CommandManifest {
    /// Catalog key (required)
    pub handler: String,

    #[serde(flatten)]
    pub data: CommandData,
}

/// An event manifest
#[derive(Debug, Clone, Deserialize)]
pub struct EventManifest {
    /// Platform event name (required)
    pub name: String,

    /// Catalog key (required)
    pub handler: String,
}

pub fn read_manifest<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Manifest(format!("Failed to read manifest: {}", e)))?;

    serde_yaml::from_str(&content)
        .map_err(|e| LoadError::Manifest(format!("Failed to parse manifest: {}", e)))
}
