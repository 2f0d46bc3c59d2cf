//! Discord adapter
//!
//! REST side of the platform: token verification on login, bulk command
//! registration, interaction callbacks and direct messages. After login a
//! gateway session (see [`gateway`]) feeds dispatches into the event stream
//! until the connection ends.

pub mod gateway;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::BotError;
use crate::domain::entities::{
    CommandData, Guild, Intents, Interaction, InteractionData, InteractionKind, InteractionOption,
    InteractionResponse, ReplyMessage, User,
};
use crate::domain::traits::{BotInfo, Client, GatewayEvent, InteractionResponder, RestApi};

pub use gateway::GATEWAY_URL;

/// Discord API base URL
pub const API_BASE: &str = "https://discord.com/api/v10";

/// Message flag: only the invoking user can see it
const EPHEMERAL: u64 = 1 << 6;

/// Interaction callback types
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
const DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE: u8 = 5;

/// Sending half of the event stream; taken when the session ends
type EventSlot = Arc<Mutex<Option<mpsc::UnboundedSender<GatewayEvent>>>>;

struct Session {
    token: String,
    user: BotInfo,
}

/// HTTP half of the client, shared with every interaction it creates
struct DiscordRest {
    api_base: String,
    http: HttpClient,
    session: RwLock<Option<Session>>,
}

impl DiscordRest {
    /// Get the API URL for a path
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn token(&self) -> Result<String, BotError> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or_else(|| BotError::Auth("client is not logged in".to_string()))
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bot {}", token))
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, BotError> {
        let response = request
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BotError::Auth(format!("{}: invalid bot token", action)));
        }
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("{} failed ({}): {}", action, status, error)));
        }
        Ok(response)
    }

    async fn current_user(&self, token: &str) -> Result<BotInfo, BotError> {
        #[derive(Deserialize)]
        struct CurrentUser {
            id: String,
            username: String,
            global_name: Option<String>,
        }

        let request = self.authorized(self.http.get(self.api_url("users/@me")), token);
        let me: CurrentUser = self
            .send(request, "Login")
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(BotInfo {
            id: me.id.clone(),
            name: me.global_name.unwrap_or_else(|| me.username.clone()),
            username: me.username,
            application_id: me.id,
        })
    }
}

/// Discord client adapter
pub struct DiscordClient {
    rest: Arc<DiscordRest>,
    gateway_url: String,
    events: EventSlot,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<GatewayEvent>>>,
    gateway: Mutex<Option<JoinHandle<()>>>,
}

impl DiscordClient {
    pub fn new() -> Self {
        Self::with_api_base(API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            rest: Arc::new(DiscordRest {
                api_base: api_base.into().trim_end_matches('/').to_string(),
                http: HttpClient::new(),
                session: RwLock::new(None),
            }),
            gateway_url: GATEWAY_URL.to_string(),
            events: Arc::new(Mutex::new(Some(sender))),
            receiver: Mutex::new(Some(receiver)),
            gateway: Mutex::new(None),
        }
    }

    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = gateway_url.into();
        self
    }

    /// Feed a raw gateway dispatch (`t` and `d` of the payload) into the
    /// event stream
    pub fn dispatch_payload(&self, event_type: &str, payload: serde_json::Value) -> Result<(), BotError> {
        dispatch(&self.rest, &self.events, event_type, payload)
    }

    fn stop_gateway(&self) {
        if let Some(task) = self.gateway.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
    }
}

impl Default for DiscordClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors with `Internal` once the event stream is gone
fn dispatch(
    rest: &Arc<DiscordRest>,
    events: &EventSlot,
    event_type: &str,
    payload: serde_json::Value,
) -> Result<(), BotError> {
    let event = if event_type == "INTERACTION_CREATE" {
        let data = parse_interaction(payload)?;
        let responder: Arc<dyn InteractionResponder> = rest.clone();
        GatewayEvent::InteractionCreate(Interaction::new(data, responder))
    } else {
        GatewayEvent::dispatch(event_name(event_type), vec![payload])
    };

    events
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .ok_or_else(|| BotError::Internal("event stream closed".to_string()))?
        .send(event)
        .map_err(|_| BotError::Internal("event stream closed".to_string()))
}

/// `MESSAGE_CREATE` -> `messageCreate`
pub fn event_name(event_type: &str) -> String {
    let mut name = String::with_capacity(event_type.len());
    for (i, part) in event_type.split('_').filter(|p| !p.is_empty()).enumerate() {
        let lower = part.to_lowercase();
        if i == 0 {
            name.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
    }
    name
}

/// Build interaction data from an `INTERACTION_CREATE` payload
pub fn parse_interaction(payload: serde_json::Value) -> Result<InteractionData, BotError> {
    #[derive(Deserialize)]
    struct RawInteraction {
        id: String,
        application_id: String,
        #[serde(rename = "type")]
        kind: u8,
        token: String,
        data: Option<RawCommandData>,
        guild_id: Option<String>,
        channel_id: Option<String>,
        member: Option<RawMember>,
        user: Option<User>,
    }

    #[derive(Deserialize)]
    struct RawCommandData {
        name: String,
        #[serde(default)]
        options: Vec<InteractionOption>,
    }

    #[derive(Deserialize)]
    struct RawMember {
        user: User,
    }

    let raw: RawInteraction = serde_json::from_value(payload)
        .map_err(|e| BotError::Parse(format!("Invalid interaction: {}", e)))?;

    let kind = InteractionKind::from_code(raw.kind)
        .ok_or_else(|| BotError::Parse(format!("Unknown interaction type {}", raw.kind)))?;

    // Guild invocations carry the user inside `member`
    let user = raw
        .member
        .map(|m| m.user)
        .or(raw.user)
        .ok_or_else(|| BotError::Parse("Interaction has no user".to_string()))?;

    let (command_name, options) = match raw.data {
        Some(data) => (Some(data.name), data.options),
        None => (None, Vec::new()),
    };

    Ok(InteractionData {
        id: raw.id,
        application_id: raw.application_id,
        token: raw.token,
        kind,
        command_name,
        options,
        user,
        guild: raw.guild_id.map(Guild::new),
        channel_id: raw.channel_id,
        created_at: chrono::Utc::now(),
    })
}

#[derive(Debug, Serialize)]
struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<u64>,
}

impl MessageBody {
    fn from_reply(message: ReplyMessage) -> Self {
        Self {
            content: Some(message.content),
            flags: message.ephemeral.then_some(EPHEMERAL),
        }
    }
}

#[derive(Debug, Serialize)]
struct CallbackBody {
    #[serde(rename = "type")]
    kind: u8,
    data: MessageBody,
}

impl From<InteractionResponse> for CallbackBody {
    fn from(response: InteractionResponse) -> Self {
        match response {
            InteractionResponse::Message(message) => Self {
                kind: CHANNEL_MESSAGE_WITH_SOURCE,
                data: MessageBody::from_reply(message),
            },
            InteractionResponse::Deferred { ephemeral } => Self {
                kind: DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE,
                data: MessageBody {
                    content: None,
                    flags: ephemeral.then_some(EPHEMERAL),
                },
            },
        }
    }
}

#[async_trait]
impl Client for DiscordClient {
    async fn login(&self, token: &str, intents: Intents) -> Result<BotInfo, BotError> {
        let info = self.rest.current_user(token).await?;
        let connection = gateway::Connection::open(&self.gateway_url, token, intents).await?;

        tracing::info!("Logged in to Discord as @{} (intents {})", info.username, intents);
        *self.rest.session.write().unwrap_or_else(PoisonError::into_inner) = Some(Session {
            token: token.to_string(),
            user: info.clone(),
        });

        self.stop_gateway();
        let task = tokio::spawn(connection.run(self.rest.clone(), self.events.clone()));
        *self.gateway.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        Ok(info)
    }

    async fn destroy(&self) -> Result<(), BotError> {
        self.stop_gateway();
        self.events.lock().unwrap_or_else(PoisonError::into_inner).take();
        *self.rest.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::info!("Discord session closed");
        Ok(())
    }

    fn current_user(&self) -> Option<BotInfo> {
        self.rest
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<GatewayEvent>> {
        self.receiver.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

#[async_trait]
impl RestApi for DiscordClient {
    async fn bulk_overwrite_global_commands(
        &self,
        token: &str,
        application_id: &str,
        commands: &[CommandData],
    ) -> Result<(), BotError> {
        let rest = &self.rest;
        let url = rest.api_url(&format!("applications/{}/commands", application_id));
        let request = rest.authorized(rest.http.put(&url), token).json(commands);
        rest.send(request, "Register commands").await?;

        tracing::debug!("Registered {} commands with Discord", commands.len());
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for DiscordRest {
    async fn respond(&self, interaction: &InteractionData, response: InteractionResponse) -> Result<(), BotError> {
        let url = self.api_url(&format!("interactions/{}/{}/callback", interaction.id, interaction.token));
        let body = CallbackBody::from(response);
        self.send(self.http.post(&url).json(&body), "Interaction callback").await?;
        Ok(())
    }

    async fn edit_original(&self, interaction: &InteractionData, content: &str) -> Result<(), BotError> {
        let url = self.api_url(&format!(
            "webhooks/{}/{}/messages/@original",
            interaction.application_id, interaction.token
        ));
        let body = MessageBody {
            content: Some(content.to_string()),
            flags: None,
        };
        self.send(self.http.patch(&url).json(&body), "Edit reply").await?;
        Ok(())
    }

    async fn follow_up(&self, interaction: &InteractionData, message: ReplyMessage) -> Result<(), BotError> {
        let url = self.api_url(&format!("webhooks/{}/{}", interaction.application_id, interaction.token));
        let body = MessageBody::from_reply(message);
        self.send(self.http.post(&url).json(&body), "Follow-up").await?;
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct CreateDm<'a> {
            recipient_id: &'a str,
        }

        #[derive(Deserialize)]
        struct Channel {
            id: String,
        }

        let token = self.token()?;
        let request = self
            .authorized(self.http.post(self.api_url("users/@me/channels")), &token)
            .json(&CreateDm { recipient_id: user_id });
        let channel: Channel = self
            .send(request, "Open DM")
            .await?
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        let url = self.api_url(&format!("channels/{}/messages", channel.id));
        let body = MessageBody {
            content: Some(content.to_string()),
            flags: None,
        };
        self.send(self.authorized(self.http.post(&url), &token).json(&body), "Send DM")
            .await?;
        Ok(())
    }
}
