//! File-based events

use std::path::{Path, PathBuf};

use super::catalog::HandlerCatalog;
use super::manifest::{read_manifest, EventManifest};
use super::{scan, LoadFailure};
use crate::application::errors::LoadError;
use crate::domain::entities::{Event, EventOptions};

/// Events loaded from a directory of manifests
pub struct FileBasedEvents {
    path: PathBuf,
    events: Vec<Event>,
    failures: Vec<LoadFailure>,
}

impl FileBasedEvents {
    pub fn new(path: impl Into<PathBuf>, catalog: &HandlerCatalog) -> Result<Self, LoadError> {
        let path = path.into();
        let mut events = Vec::new();
        let mut failures = Vec::new();

        for file in scan(&path, "events")? {
            match load_event(&file, catalog) {
                Ok(event) => {
                    tracing::debug!("Loaded event '{}' from {}", event.name(), file.display());
                    events.push(event);
                }
                Err(e) => {
                    tracing::error!("Error loading event {}: {}", file.display(), e);
                    failures.push(LoadFailure::new(file, &e));
                }
            }
        }

        tracing::info!("Loaded {} events from {}", events.len(), path.display());
        Ok(Self {
            path,
            events,
            failures,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }
}

fn load_event(path: &Path, catalog: &HandlerCatalog) -> Result<Event, LoadError> {
    let manifest: EventManifest = read_manifest(path)?;

    let handler = catalog
        .event(&manifest.handler)
        .ok_or_else(|| LoadError::UnknownHandler(manifest.handler.clone()))?;

    Ok(Event::new(EventOptions::new(manifest.name).with_shared_handler(handler))?)
}

impl IntoIterator for FileBasedEvents {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileBasedEvents {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
