//! Interactions - inbound command invocations and their acknowledgment state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Guild, User};
use crate::application::errors::BotError;
use crate::domain::traits::InteractionResponder;

/// Kind of interaction, as numbered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
}

impl InteractionKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(InteractionKind::Ping),
            2 => Some(InteractionKind::ApplicationCommand),
            3 => Some(InteractionKind::MessageComponent),
            4 => Some(InteractionKind::Autocomplete),
            5 => Some(InteractionKind::ModalSubmit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InteractionKind::Ping => "ping",
            InteractionKind::ApplicationCommand => "application_command",
            InteractionKind::MessageComponent => "message_component",
            InteractionKind::Autocomplete => "autocomplete",
            InteractionKind::ModalSubmit => "modal_submit",
        }
    }
}

/// A resolved option value supplied by the invoking user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    pub value: serde_json::Value,
}

/// Raw interaction payload
#[derive(Debug, Clone)]
pub struct InteractionData {
    pub id: String,
    pub application_id: String,
    /// Continuation token used to respond
    pub token: String,
    pub kind: InteractionKind,
    pub command_name: Option<String>,
    pub options: Vec<InteractionOption>,
    pub user: User,
    pub guild: Option<Guild>,
    pub channel_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InteractionData {
    pub fn command(name: impl Into<String>, user: User) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            application_id: String::new(),
            token: uuid::Uuid::new_v4().to_string(),
            kind: InteractionKind::ApplicationCommand,
            command_name: Some(name.into()),
            options: Vec::new(),
            user,
            guild: None,
            channel_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_kind(mut self, kind: InteractionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.push(InteractionOption {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.guild = Some(guild);
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = application_id.into();
        self
    }
}

/// Message content sent back to the invoking user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    pub content: String,
    /// Visible only to the invoking user
    pub ephemeral: bool,
}

impl ReplyMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

impl From<&str> for ReplyMessage {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for ReplyMessage {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// Initial response to an interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionResponse {
    Message(ReplyMessage),
    Deferred { ephemeral: bool },
}

struct Inner {
    data: InteractionData,
    responder: Arc<dyn InteractionResponder>,
    replied: AtomicBool,
    deferred: AtomicBool,
}

/// Handle to an incoming interaction; clones share acknowledgment state
#[derive(Clone)]
pub struct Interaction {
    inner: Arc<Inner>,
}

impl Interaction {
    pub fn new(data: InteractionData, responder: Arc<dyn InteractionResponder>) -> Self {
        Self {
            inner: Arc::new(Inner {
                data,
                responder,
                replied: AtomicBool::new(false),
                deferred: AtomicBool::new(false),
            }),
        }
    }

    pub fn data(&self) -> &InteractionData {
        &self.inner.data
    }

    pub fn id(&self) -> &str {
        &self.inner.data.id
    }

    pub fn kind(&self) -> InteractionKind {
        self.inner.data.kind
    }

    pub fn is_command(&self) -> bool {
        self.inner.data.kind == InteractionKind::ApplicationCommand
    }

    pub fn command_name(&self) -> Option<&str> {
        self.inner.data.command_name.as_deref()
    }

    pub fn user(&self) -> &User {
        &self.inner.data.user
    }

    pub fn guild(&self) -> Option<&Guild> {
        self.inner.data.guild.as_ref()
    }

    pub fn option(&self, name: &str) -> Option<&serde_json::Value> {
        self.inner
            .data
            .options
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(|v| v.as_str())
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.option(name).and_then(|v| v.as_i64())
    }

    pub fn is_replied(&self) -> bool {
        self.inner.replied.load(Ordering::SeqCst)
    }

    pub fn is_deferred(&self) -> bool {
        self.inner.deferred.load(Ordering::SeqCst)
    }

    fn is_acknowledged(&self) -> bool {
        self.is_replied() || self.is_deferred()
    }

    /// Send the initial reply
    pub async fn reply(&self, message: impl Into<ReplyMessage>) -> Result<(), BotError> {
        if self.is_acknowledged() {
            return Err(BotError::AlreadyAcknowledged);
        }
        self.inner
            .responder
            .respond(&self.inner.data, InteractionResponse::Message(message.into()))
            .await?;
        self.inner.replied.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Acknowledge now and reply later with [`Interaction::edit_reply`].
    ///
    /// The interaction counts as deferred as soon as this is called, so the
    /// returned future can be detached without racing the command.
    pub fn defer_reply(&self, ephemeral: bool) -> impl Future<Output = Result<(), BotError>> + Send + 'static {
        let acknowledged = self.is_replied() || self.inner.deferred.swap(true, Ordering::SeqCst);
        let this = self.clone();
        async move {
            if acknowledged {
                return Err(BotError::AlreadyAcknowledged);
            }
            let result = this
                .inner
                .responder
                .respond(&this.inner.data, InteractionResponse::Deferred { ephemeral })
                .await;
            if result.is_err() {
                this.inner.deferred.store(false, Ordering::SeqCst);
            }
            result
        }
    }

    /// Replace the content of the initial (or deferred) reply
    pub async fn edit_reply(&self, content: impl Into<String>) -> Result<(), BotError> {
        if !self.is_acknowledged() {
            return Err(BotError::NotAcknowledged);
        }
        self.inner
            .responder
            .edit_original(&self.inner.data, &content.into())
            .await?;
        self.inner.replied.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Send an additional message after the initial reply
    pub async fn follow_up(&self, message: impl Into<ReplyMessage>) -> Result<(), BotError> {
        if !self.is_acknowledged() {
            return Err(BotError::NotAcknowledged);
        }
        self.inner
            .responder
            .follow_up(&self.inner.data, message.into())
            .await
    }

    /// Direct-message the invoking user
    pub async fn send_direct(&self, content: impl Into<String>) -> Result<(), BotError> {
        self.inner
            .responder
            .send_direct_message(&self.inner.data.user.id, &content.into())
            .await
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("data", &self.inner.data)
            .field("replied", &self.is_replied())
            .field("deferred", &self.is_deferred())
            .finish()
    }
}
