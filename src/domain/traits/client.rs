use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{Intents, Interaction, InteractionData, InteractionResponse, ReplyMessage};

/// Client trait - abstraction over the platform gateway connection
#[async_trait]
pub trait Client: Send + Sync {
    /// Log in with a bot token and start receiving notifications
    async fn login(&self, token: &str, intents: Intents) -> Result<BotInfo, BotError>;

    /// Tear down the connection
    async fn destroy(&self) -> Result<(), BotError>;

    /// The logged-in bot, if any
    fn current_user(&self) -> Option<BotInfo>;

    /// Stream of inbound notifications; can be taken once
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<GatewayEvent>>;
}

/// Responder trait - sends interaction responses back to the platform
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Initial response: a message or a deferral
    async fn respond(&self, interaction: &InteractionData, response: InteractionResponse) -> Result<(), BotError>;

    /// Edit the original response
    async fn edit_original(&self, interaction: &InteractionData, content: &str) -> Result<(), BotError>;

    /// Additional message after the initial response
    async fn follow_up(&self, interaction: &InteractionData, message: ReplyMessage) -> Result<(), BotError>;

    /// Open a DM channel with a user and post a message
    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<(), BotError>;
}

/// Notification delivered by the client
#[derive(Debug, Clone)]
pub enum GatewayEvent {
    InteractionCreate(Interaction),
    /// Any other platform event, by name, with its raw arguments
    Dispatch {
        name: String,
        args: Vec<serde_json::Value>,
    },
}

impl GatewayEvent {
    pub fn dispatch(name: impl Into<String>, args: Vec<serde_json::Value>) -> Self {
        GatewayEvent::Dispatch {
            name: name.into(),
            args,
        }
    }
}

/// Bot information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
    /// Application the bot's commands are registered under
    pub application_id: String,
}
