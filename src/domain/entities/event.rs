use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::application::errors::ConstructionError;
use crate::application::Application;

/// Handler invoked with the application and the platform event arguments
pub type EventHandler = Arc<dyn Fn(&Application, &[serde_json::Value]) + Send + Sync>;

/// Options used to build an [`Event`]
#[derive(Default)]
pub struct EventOptions {
    pub name: String,
    pub handler: Option<EventHandler>,
}

impl EventOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: None,
        }
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Application, &[serde_json::Value]) + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn with_shared_handler(mut self, handler: EventHandler) -> Self {
        self.handler = Some(handler);
        self
    }
}

/// A handler bound to one platform event (e.g. `ready`, `messageCreate`)
#[derive(Clone)]
pub struct Event {
    name: String,
    handler: EventHandler,
}

impl Event {
    pub fn new(options: EventOptions) -> Result<Self, ConstructionError> {
        if options.name.is_empty() {
            return Err(ConstructionError::MissingName);
        }
        let handler = options.handler.ok_or(ConstructionError::MissingHandler)?;
        Ok(Self {
            name: options.name,
            handler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &EventHandler {
        &self.handler
    }

    pub fn execute(&self, app: &Application, args: &[serde_json::Value]) {
        (self.handler)(app, args)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Event registry keyed by platform event name
#[derive(Default)]
pub struct EventRegistry {
    events: BTreeMap<String, Arc<Event>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under the same name replace earlier ones
    pub fn register(&mut self, event: Event) {
        if let Some(previous) = self.events.insert(event.name().to_string(), Arc::new(event)) {
            tracing::debug!("Event '{}' replaced by a later registration", previous.name());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Event>> {
        self.events.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<Event>> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<Event> for EventRegistry {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        let mut registry = Self::new();
        for event in iter {
            registry.register(event);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_requires_name() {
        let err = Event::new(EventOptions::new("").with_handler(|_, _| {})).unwrap_err();
        assert_eq!(err, ConstructionError::MissingName);
    }

    #[test]
    fn event_requires_handler() {
        let err = Event::new(EventOptions::new("ready")).unwrap_err();
        assert_eq!(err, ConstructionError::MissingHandler);
    }

    #[test]
    fn default_options_fail_on_name_first() {
        let err = Event::new(EventOptions::default()).unwrap_err();
        assert_eq!(err, ConstructionError::MissingName);
    }

    #[test]
    fn registry_keys_by_name() {
        let registry: EventRegistry = vec![
            Event::new(EventOptions::new("ready").with_handler(|_, _| {})).unwrap(),
            Event::new(EventOptions::new("messageCreate").with_handler(|_, _| {})).unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("ready").unwrap().name(), "ready");
        assert!(registry.get("guildCreate").is_none());
    }
}
