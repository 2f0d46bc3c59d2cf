//! Application - owns the client, the command/event maps and the
//! authorization handshake

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::application::auth::{AuthState, Credentials};
use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::notifications::{ListenerId, Notifications};
use crate::domain::entities::{
    Command, CommandData, CommandRegistry, Event, EventRegistry, Intents, Interaction,
};
use crate::domain::traits::{Client, RestApi};

/// Time a failed command gets to reply on its own once an error listener exists
pub const DEFAULT_ERROR_REPLY_GRACE: Duration = Duration::from_millis(1500);

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    /// Log command failures at error level
    pub debug: bool,
    /// Defer every command reply (ephemeral) before executing it
    pub defer_reply: bool,
    /// How long a failed command may still reply on its own before the
    /// generic reply goes out; only applies once a `commandError` listener
    /// is registered
    pub error_reply_grace: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            debug: false,
            defer_reply: false,
            error_reply_grace: DEFAULT_ERROR_REPLY_GRACE,
        }
    }
}

/// Options used to build an [`Application`]
pub struct ApplicationOptions {
    pub name: String,
    pub commands: Vec<Command>,
    pub events: Vec<Event>,
    pub intents: Option<Intents>,
    pub settings: AppSettings,
}

impl ApplicationOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            events: Vec::new(),
            intents: None,
            settings: AppSettings::default(),
        }
    }

    /// Accepts an explicit list or a directory loader
    pub fn with_commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = Some(intents);
        self
    }

    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.settings = settings;
        self
    }
}

struct AppInner {
    name: String,
    settings: AppSettings,
    intents: Intents,
    client: Arc<dyn Client>,
    rest: Arc<dyn RestApi>,
    commands: CommandRegistry,
    events: EventRegistry,
    notifications: Notifications,
    state: RwLock<AuthState>,
}

/// Handle to a bot application; clones share the same state
#[derive(Clone)]
pub struct Application {
    inner: Arc<AppInner>,
}

impl Application {
    pub fn new(options: ApplicationOptions, client: Arc<dyn Client>, rest: Arc<dyn RestApi>) -> Self {
        let intents = options.intents.unwrap_or_else(|| {
            tracing::warn!("No intents were provided. This may cause issues with your application.");
            Intents::minimal()
        });

        let commands: CommandRegistry = options.commands.into_iter().collect();
        let events: EventRegistry = options.events.into_iter().collect();
        for event in events.all() {
            tracing::debug!("Listening for '{}'", event.name());
        }

        tracing::info!(
            "Application {} ready with {} commands and {} events",
            options.name,
            commands.len(),
            events.len()
        );

        Self {
            inner: Arc::new(AppInner {
                name: options.name,
                settings: options.settings,
                intents,
                client,
                rest,
                commands,
                events,
                notifications: Notifications::new(),
                state: RwLock::new(AuthState::Unauthorized),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn settings(&self) -> &AppSettings {
        &self.inner.settings
    }

    pub fn intents(&self) -> Intents {
        self.inner.intents
    }

    /// The underlying platform client
    pub fn client(&self) -> &Arc<dyn Client> {
        &self.inner.client
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.inner.commands
    }

    pub fn events(&self) -> &EventRegistry {
        &self.inner.events
    }

    pub fn notifications(&self) -> &Notifications {
        &self.inner.notifications
    }

    pub fn on_command_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CommandError, &Interaction, &Command) + Send + Sync + 'static,
    {
        self.inner.notifications.on_command_error(listener)
    }

    pub fn on_command_registered<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Command) + Send + Sync + 'static,
    {
        self.inner.notifications.on_command_registered(listener)
    }

    pub fn on_commands_registered<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Application) + Send + Sync + 'static,
    {
        self.inner.notifications.on_commands_registered(listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.notifications.off(id)
    }

    pub fn state(&self) -> AuthState {
        *self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: AuthState) {
        *self.inner.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Authorized and the client reports a logged-in user
    pub fn is_authorized(&self) -> bool {
        self.state() == AuthState::Authorized && self.inner.client.current_user().is_some()
    }

    /// Log in, then push every command description to the platform.
    ///
    /// A failed login leaves the application unauthorized and returns the
    /// client's error. A failed registration is only logged.
    pub async fn authorize(&self, credentials: &Credentials) -> Result<(), BotError> {
        let token = credentials.resolve()?.to_string();

        self.set_state(AuthState::Authorizing);
        let me = match self.inner.client.login(&token, self.inner.intents).await {
            Ok(me) => me,
            Err(e) => {
                self.set_state(AuthState::Unauthorized);
                tracing::error!("Login failed for {}: {}", self.inner.name, e);
                return Err(e);
            }
        };
        self.set_state(AuthState::Authorized);
        tracing::info!("{} authorized as @{}", self.inner.name, me.username);

        self.register_commands(&token, &me.application_id).await;
        Ok(())
    }

    async fn register_commands(&self, token: &str, application_id: &str) {
        let mut payloads: Vec<CommandData> = Vec::with_capacity(self.inner.commands.len());
        for command in self.inner.commands.all() {
            payloads.push(command.data().clone());
            self.inner.notifications.emit_command_registered(command);
        }

        match self
            .inner
            .rest
            .bulk_overwrite_global_commands(token, application_id, &payloads)
            .await
        {
            Ok(()) => {
                tracing::info!("Successfully registered {} commands", payloads.len());
                self.inner.notifications.emit_commands_registered(self);
            }
            Err(e) => tracing::error!("Failed to register commands: {}", e),
        }
    }

    /// Disconnect from the platform
    pub async fn deauthorize(&self) -> Result<(), BotError> {
        let result = self.inner.client.destroy().await;
        self.set_state(AuthState::Unauthorized);
        tracing::info!("{} deauthorized", self.inner.name);
        result
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.inner.name)
            .field("settings", &self.inner.settings)
            .field("intents", &self.inner.intents)
            .field("state", &self.state())
            .field("commands", &self.inner.commands.len())
            .field("events", &self.inner.events.len())
            .finish()
    }
}
