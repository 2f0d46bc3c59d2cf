//! File-based commands

use std::path::{Path, PathBuf};

use super::catalog::HandlerCatalog;
use super::manifest::{read_manifest, CommandManifest};
use super::{scan, LoadFailure};
use crate::application::errors::LoadError;
use crate::domain::entities::{Command, CommandOptions};

/// Commands loaded from a directory of manifests
pub struct FileBasedCommands {
    path: PathBuf,
    commands: Vec<Command>,
    failures: Vec<LoadFailure>,
}

impl FileBasedCommands {
    /// Load every manifest in `path`; bad files are logged and skipped
    pub fn new(path: impl Into<PathBuf>, catalog: &HandlerCatalog) -> Result<Self, LoadError> {
        let path = path.into();
        let mut commands = Vec::new();
        let mut failures = Vec::new();

        for file in scan(&path, "commands")? {
            match load_command(&file, catalog) {
                Ok(command) => {
                    tracing::debug!("Loaded command /{} from {}", command.name(), file.display());
                    commands.push(command);
                }
                Err(e) => {
                    tracing::error!("Error loading command {}: {}", file.display(), e);
                    failures.push(LoadFailure::new(file, &e));
                }
            }
        }

        tracing::info!("Loaded {} commands from {}", commands.len(), path.display());
        Ok(Self {
            path,
            commands,
            failures,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Manifests that were rejected
    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }
}

fn load_command(path: &Path, catalog: &HandlerCatalog) -> Result<Command, LoadError> {
    let manifest: CommandManifest = read_manifest(path)?;
    manifest.data.validate()?;

    let handler = catalog
        .command(&manifest.handler)
        .ok_or_else(|| LoadError::UnknownHandler(manifest.handler.clone()))?;

    Ok(Command::new(CommandOptions::new(manifest.data).with_handler(handler))?)
}

impl IntoIterator for FileBasedCommands {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileBasedCommands {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
