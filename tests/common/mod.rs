//! Shared mocks for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::mpsc;

use maestro::application::errors::BotError;
use maestro::domain::entities::{CommandData, Intents, Interaction, InteractionData, InteractionResponse, ReplyMessage, User};
use maestro::domain::traits::{BotInfo, Client, GatewayEvent, InteractionResponder, RestApi};

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn bot_info() -> BotInfo {
    BotInfo {
        id: "100".to_string(),
        name: "Maestro".to_string(),
        username: "maestro".to_string(),
        application_id: "app-1".to_string(),
    }
}

/// A REST submission captured by [`MockClient`]
#[derive(Debug, Clone)]
pub struct RestCall {
    pub token: String,
    pub application_id: String,
    pub commands: Vec<CommandData>,
}

/// Client and REST API in one, with scripted outcomes
pub struct MockClient {
    pub login_error: Mutex<Option<BotError>>,
    pub rest_error: Mutex<Option<BotError>>,
    pub logins: Mutex<Vec<(String, Intents)>>,
    pub rest_calls: Mutex<Vec<RestCall>>,
    pub destroyed: AtomicBool,
    user: Mutex<Option<BotInfo>>,
    sender: Mutex<Option<mpsc::UnboundedSender<GatewayEvent>>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<GatewayEvent>>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        let (sender, receiver) = mpsc::unbounded_channel();
        Arc::new(Self {
            login_error: Mutex::new(None),
            rest_error: Mutex::new(None),
            logins: Mutex::new(Vec::new()),
            rest_calls: Mutex::new(Vec::new()),
            destroyed: AtomicBool::new(false),
            user: Mutex::new(None),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
        })
    }

    pub fn failing_login(error: BotError) -> Arc<Self> {
        let client = Self::new();
        *client.login_error.lock().unwrap() = Some(error);
        client
    }

    pub fn fail_rest(&self, error: BotError) {
        *self.rest_error.lock().unwrap() = Some(error);
    }

    /// Feed a notification into the event stream
    pub fn push(&self, event: GatewayEvent) {
        self.sender.lock().unwrap().as_ref().unwrap().send(event).unwrap();
    }

    /// End the event stream, as a disconnect would
    pub fn close(&self) {
        self.sender.lock().unwrap().take();
    }

    pub fn rest_calls(&self) -> Vec<RestCall> {
        self.rest_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Client for MockClient {
    async fn login(&self, token: &str, intents: Intents) -> Result<BotInfo, BotError> {
        self.logins.lock().unwrap().push((token.to_string(), intents));
        if let Some(e) = self.login_error.lock().unwrap().take() {
            return Err(e);
        }
        let info = bot_info();
        *self.user.lock().unwrap() = Some(info.clone());
        Ok(info)
    }

    async fn destroy(&self) -> Result<(), BotError> {
        self.destroyed.store(true, Ordering::SeqCst);
        *self.user.lock().unwrap() = None;
        Ok(())
    }

    fn current_user(&self) -> Option<BotInfo> {
        self.user.lock().unwrap().clone()
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<GatewayEvent>> {
        self.receiver.lock().unwrap().take()
    }
}

#[async_trait]
impl RestApi for MockClient {
    async fn bulk_overwrite_global_commands(
        &self,
        token: &str,
        application_id: &str,
        commands: &[CommandData],
    ) -> Result<(), BotError> {
        self.rest_calls.lock().unwrap().push(RestCall {
            token: token.to_string(),
            application_id: application_id.to_string(),
            commands: commands.to_vec(),
        });
        match self.rest_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Responder that records everything sent through it
#[derive(Default)]
pub struct RecordingResponder {
    pub responses: Mutex<Vec<InteractionResponse>>,
    pub edits: Mutex<Vec<String>>,
    pub follow_ups: Mutex<Vec<ReplyMessage>>,
    pub direct_messages: Mutex<Vec<(String, String)>>,
    /// Every successful call, in the order it reached the platform
    pub log: Mutex<Vec<&'static str>>,
    /// Every call fails with a network error
    pub fail: AtomicBool,
}

impl RecordingResponder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let responder = Self::new();
        responder.fail.store(true, Ordering::SeqCst);
        responder
    }

    pub fn replies(&self) -> Vec<ReplyMessage> {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| match r {
                InteractionResponse::Message(m) => Some(m.clone()),
                InteractionResponse::Deferred { .. } => None,
            })
            .collect()
    }

    pub fn deferrals(&self) -> Vec<bool> {
        self.responses
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| match r {
                InteractionResponse::Deferred { ephemeral } => Some(*ephemeral),
                InteractionResponse::Message(_) => None,
            })
            .collect()
    }

    /// Call sequence: `reply`, `defer`, `edit`, `follow_up`, `dm`
    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.log.lock().unwrap().push(call);
    }

    pub fn dms(&self) -> Vec<(String, String)> {
        self.direct_messages.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), BotError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BotError::Network("responder offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn respond(&self, _interaction: &InteractionData, response: InteractionResponse) -> Result<(), BotError> {
        self.check()?;
        self.record(match response {
            InteractionResponse::Message(_) => "reply",
            InteractionResponse::Deferred { .. } => "defer",
        });
        self.responses.lock().unwrap().push(response);
        Ok(())
    }

    async fn edit_original(&self, _interaction: &InteractionData, content: &str) -> Result<(), BotError> {
        self.check()?;
        self.record("edit");
        self.edits.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn follow_up(&self, _interaction: &InteractionData, message: ReplyMessage) -> Result<(), BotError> {
        self.check()?;
        self.record("follow_up");
        self.follow_ups.lock().unwrap().push(message);
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<(), BotError> {
        self.check()?;
        self.record("dm");
        self.direct_messages
            .lock()
            .unwrap()
            .push((user_id.to_string(), content.to_string()));
        Ok(())
    }
}

/// A slash-command interaction from user `42`
pub fn command_interaction(name: &str, responder: &Arc<RecordingResponder>) -> Interaction {
    let data = InteractionData::command(name, User::new("42").with_username("tester"));
    interaction_from(data, responder)
}

pub fn interaction_from(data: InteractionData, responder: &Arc<RecordingResponder>) -> Interaction {
    let responder: Arc<dyn InteractionResponder> = responder.clone();
    Interaction::new(data, responder)
}
