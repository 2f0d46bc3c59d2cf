//! Handler catalog - named callbacks that manifests refer to

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::application::Application;
use crate::domain::entities::{CommandHandler, CommandResult, EventHandler, Interaction};

/// Registration point for the code behind file-based commands and events
#[derive(Default)]
pub struct HandlerCatalog {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    events: HashMap<String, EventHandler>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_command<F, Fut>(&mut self, key: impl Into<String>, execute: F) -> &mut Self
    where
        F: Fn(Interaction, Application) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.register_command_handler(key, Arc::new(execute))
    }

    pub fn register_command_handler(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) -> &mut Self {
        self.commands.insert(key.into(), handler);
        self
    }

    pub fn register_event<F>(&mut self, key: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&Application, &[serde_json::Value]) + Send + Sync + 'static,
    {
        self.events.insert(key.into(), Arc::new(handler));
        self
    }

    pub fn command(&self, key: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(key).cloned()
    }

    pub fn event(&self, key: &str) -> Option<EventHandler> {
        self.events.get(key).cloned()
    }
}
