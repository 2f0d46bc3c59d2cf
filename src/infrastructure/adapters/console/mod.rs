//! Console adapter for development/testing
//!
//! Lines starting with `/` become command interactions (`/rps choice=Rock`);
//! any other line is dispatched as a `messageCreate` event.

use async_trait::async_trait;
use std::io::BufRead;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{
    CommandData, Intents, Interaction, InteractionData, InteractionResponse, ReplyMessage, User,
};
use crate::domain::traits::{BotInfo, Client, GatewayEvent, InteractionResponder, RestApi};

/// Prints responses to stdout
#[derive(Debug, Default)]
pub struct ConsoleResponder;

#[async_trait]
impl InteractionResponder for ConsoleResponder {
    async fn respond(&self, _interaction: &InteractionData, response: InteractionResponse) -> Result<(), BotError> {
        match response {
            InteractionResponse::Message(message) => print_message(&message),
            InteractionResponse::Deferred { .. } => println!("[BOT] is thinking..."),
        }
        Ok(())
    }

    async fn edit_original(&self, _interaction: &InteractionData, content: &str) -> Result<(), BotError> {
        println!("[BOT] (edited) {}", content);
        Ok(())
    }

    async fn follow_up(&self, _interaction: &InteractionData, message: ReplyMessage) -> Result<(), BotError> {
        print_message(&message);
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> Result<(), BotError> {
        println!("[DM -> {}] {}", user_id, content);
        Ok(())
    }
}

fn print_message(message: &ReplyMessage) {
    if message.ephemeral {
        println!("[BOT] (only you can see this) {}", message.content);
    } else {
        println!("[BOT] {}", message.content);
    }
}

/// Console client for local development
pub struct ConsoleClient {
    info: BotInfo,
    invoker: User,
    responder: Arc<ConsoleResponder>,
    session: RwLock<Option<BotInfo>>,
    sender: Mutex<Option<mpsc::UnboundedSender<GatewayEvent>>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<GatewayEvent>>>,
}

impl ConsoleClient {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "maestro".to_string(),
                username: "console".to_string(),
                application_id: "console".to_string(),
            },
            invoker: User::new("console-user").with_username("you"),
            responder: Arc::new(ConsoleResponder),
            session: RwLock::new(None),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Turn one input line into a notification
    pub fn parse_line(&self, line: &str) -> Option<GatewayEvent> {
        parse_line(line, &self.invoker, &self.responder)
    }
}

impl Default for ConsoleClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_line(line: &str, invoker: &User, responder: &Arc<ConsoleResponder>) -> Option<GatewayEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(command) = line.strip_prefix('/') else {
        let message = serde_json::json!({ "content": line, "author": invoker });
        return Some(GatewayEvent::dispatch("messageCreate", vec![message]));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next()?;
    let mut data = InteractionData::command(name, invoker.clone()).with_application_id("console");
    for arg in parts {
        if let Some((key, value)) = arg.split_once('=') {
            data = data.with_option(key, parse_value(value));
        }
    }

    let responder: Arc<dyn InteractionResponder> = responder.clone();
    Some(GatewayEvent::InteractionCreate(Interaction::new(data, responder)))
}

fn parse_value(raw: &str) -> serde_json::Value {
    if let Ok(n) = raw.parse::<i64>() {
        return n.into();
    }
    match raw {
        "true" => true.into(),
        "false" => false.into(),
        _ => raw.into(),
    }
}

#[async_trait]
impl Client for ConsoleClient {
    async fn login(&self, _token: &str, intents: Intents) -> Result<BotInfo, BotError> {
        tracing::info!("Starting console client (dev mode, intents {})", intents);
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(self.info.clone());

        let Some(sender) = self.sender.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Ok(self.info.clone());
        };

        let _ = sender.send(GatewayEvent::dispatch(
            "ready",
            vec![serde_json::json!({ "user": { "id": self.info.id, "username": self.info.username } })],
        ));

        let invoker = self.invoker.clone();
        let responder = self.responder.clone();
        // stdin blocks; the stream closes on EOF
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if let Some(event) = parse_line(&line, &invoker, &responder) {
                    if sender.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Ok(self.info.clone())
    }

    async fn destroy(&self) -> Result<(), BotError> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn current_user(&self) -> Option<BotInfo> {
        self.session.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<GatewayEvent>> {
        self.receiver.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

#[async_trait]
impl RestApi for ConsoleClient {
    async fn bulk_overwrite_global_commands(
        &self,
        _token: &str,
        _application_id: &str,
        commands: &[CommandData],
    ) -> Result<(), BotError> {
        for command in commands {
            println!("[REST] /{} - {}", command.name, command.description);
        }
        Ok(())
    }
}
