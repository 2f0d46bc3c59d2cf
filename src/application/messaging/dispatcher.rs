//! Dispatcher - routes gateway notifications to commands and events

use tokio::task::JoinHandle;

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::notifications::ApplicationEvent;
use crate::application::Application;
use crate::domain::entities::{Command, Interaction, ReplyMessage};
use crate::domain::traits::GatewayEvent;

/// Reply sent when a failed command never answered the interaction
pub const GENERIC_ERROR_REPLY: &str = "An error occurred while executing this command.";

/// Direct message sent when a failed command had already answered
pub const GENERIC_ERROR_NOTICE: &str = "An error occurred while executing your previous command.";

impl Application {
    /// Consume the client's notification stream until it closes
    pub async fn run(&self) -> Result<(), BotError> {
        let mut events = self
            .client()
            .take_events()
            .ok_or_else(|| BotError::Internal("event stream already taken".to_string()))?;

        tracing::info!("{} listening for events", self.name());
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::info!("Event stream closed");
        Ok(())
    }

    /// Route one notification; interactions run on their own task
    pub fn handle(&self, event: GatewayEvent) -> Option<JoinHandle<()>> {
        match event {
            GatewayEvent::InteractionCreate(interaction) => {
                let app = self.clone();
                Some(tokio::spawn(async move {
                    app.dispatch_interaction(interaction).await;
                }))
            }
            GatewayEvent::Dispatch { name, args } => {
                self.dispatch_event(&name, &args);
                None
            }
        }
    }

    /// Invoke the event registered under `name`, if any
    pub fn dispatch_event(&self, name: &str, args: &[serde_json::Value]) -> bool {
        match self.events().get(name) {
            Some(event) => {
                tracing::debug!("Dispatching event '{}'", name);
                event.execute(self, args);
                true
            }
            None => false,
        }
    }

    /// Run the command an interaction names and recover from its failure
    pub async fn dispatch_interaction(&self, interaction: Interaction) {
        if !interaction.is_command() {
            return;
        }
        let Some(command) = interaction
            .command_name()
            .and_then(|name| self.commands().get(name))
            .cloned()
        else {
            return;
        };
        if let Some(guild) = interaction.guild() {
            if !guild.available {
                tracing::warn!("Guild {} is not available, skipping command execution.", guild.id);
                return;
            }
        }

        // The acknowledgment must reach the platform before anything the
        // command sends; a failed deferral still runs the command.
        if self.settings().defer_reply {
            if let Err(e) = interaction.defer_reply(true).await {
                tracing::debug!("Failed to defer reply: {}", e);
            }
        }

        tracing::debug!("[{}] /{}", interaction.user(), command.name());
        if let Err(error) = command.execute(interaction.clone(), self.clone()).await {
            self.recover(error, &interaction, &command).await;
        }
    }

    async fn recover(&self, error: CommandError, interaction: &Interaction, command: &Command) {
        if self.settings().debug {
            tracing::error!("Command /{} failed: {}", command.name(), error);
        } else {
            tracing::debug!("Command /{} failed: {}", command.name(), error);
        }

        let notifications = self.notifications();
        notifications.emit_command_error(&error, interaction, command);

        if notifications.listener_count(ApplicationEvent::CommandError) > 0 {
            tokio::time::sleep(self.settings().error_reply_grace).await;

            if !interaction.is_replied() && !interaction.is_deferred() {
                send_generic_reply(interaction).await;
                if self.settings().debug {
                    tracing::warn!(
                        "Command /{} failed with an error listener registered, but the interaction was not replied to.",
                        command.name()
                    );
                }
                return;
            }
        }

        if interaction.is_replied() || interaction.is_deferred() {
            // users may have DMs disabled
            if let Err(e) = interaction.send_direct(GENERIC_ERROR_NOTICE).await {
                tracing::debug!("Could not DM {}: {}", interaction.user(), e);
            }
            return;
        }

        send_generic_reply(interaction).await;
    }
}

async fn send_generic_reply(interaction: &Interaction) {
    if let Err(e) = interaction
        .reply(ReplyMessage::new(GENERIC_ERROR_REPLY).ephemeral())
        .await
    {
        tracing::debug!("Could not send error reply to {}: {}", interaction.user(), e);
    }
}
