//! maestro - a slash-command bot framework
//!
//! Commands and events are declared once (in code or as YAML manifests),
//! registered with the platform on login, and dispatched as interactions
//! arrive.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::errors::{BotError, CommandError, ConfigError, ConstructionError, LoadError};
pub use application::{AppSettings, Application, ApplicationOptions, AuthState, Credentials};
pub use domain::entities::{
    Command, CommandData, CommandOption, CommandOptions, CommandResult, Event, EventOptions, GatewayIntent,
    Intents, Interaction, ReplyMessage,
};
pub use infrastructure::loaders::{FileBasedCommands, FileBasedEvents, HandlerCatalog};
