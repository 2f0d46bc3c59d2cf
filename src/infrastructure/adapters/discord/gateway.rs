//! Gateway session
//!
//! Opens the websocket, waits for hello, identifies with the bot token and
//! intents, then heartbeats while forwarding every dispatch into the event
//! stream. The stream closes when the session ends, which lets
//! `Application::run` return.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{dispatch, DiscordRest, EventSlot};
use crate::application::errors::BotError;
use crate::domain::entities::Intents;

/// Discord gateway URL (API v10, JSON encoding)
pub const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

// Opcodes
const DISPATCH: u8 = 0;
const HEARTBEAT: u8 = 1;
const IDENTIFY: u8 = 2;
const RECONNECT: u8 = 7;
const INVALID_SESSION: u8 = 9;
const HELLO: u8 = 10;
const HEARTBEAT_ACK: u8 = 11;

#[derive(Debug, Deserialize)]
struct Frame {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Serialize)]
struct Outgoing<T> {
    op: u8,
    d: T,
}

#[derive(Serialize)]
struct Identify<'a> {
    token: &'a str,
    intents: u64,
    properties: Properties,
}

#[derive(Serialize)]
struct Properties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

impl Identify<'_> {
    fn new(token: &str, intents: Intents) -> Identify<'_> {
        Identify {
            token,
            intents: intents.bits(),
            properties: Properties {
                os: std::env::consts::OS,
                browser: "maestro",
                device: "maestro",
            },
        }
    }
}

/// An identified gateway connection that has not started heartbeating
pub(super) struct Connection {
    writer: WsSink,
    reader: WsReader,
    heartbeat: Duration,
}

impl Connection {
    pub(super) async fn open(url: &str, token: &str, intents: Intents) -> Result<Self, BotError> {
        tracing::debug!("Connecting to gateway {}", url);
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| BotError::Network(format!("Gateway connection failed: {}", e)))?;
        let (mut writer, mut reader) = stream.split();

        let hello = next_frame(&mut reader)
            .await?
            .ok_or_else(|| BotError::Network("Gateway closed before hello".to_string()))?;
        if hello.op != HELLO {
            return Err(BotError::Parse(format!("Expected hello, got opcode {}", hello.op)));
        }
        let interval = hello
            .d
            .get("heartbeat_interval")
            .and_then(Value::as_u64)
            .filter(|ms| *ms > 0)
            .ok_or_else(|| BotError::Parse("Hello without heartbeat interval".to_string()))?;

        send(&mut writer, IDENTIFY, Identify::new(token, intents)).await?;
        tracing::debug!("Identified with gateway, heartbeat every {}ms", interval);

        Ok(Self {
            writer,
            reader,
            heartbeat: Duration::from_millis(interval),
        })
    }

    /// Heartbeat and forward dispatches until the connection ends
    pub(super) async fn run(self, rest: Arc<DiscordRest>, events: EventSlot) {
        let Connection {
            mut writer,
            mut reader,
            heartbeat,
        } = self;
        let mut ticks = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);
        let mut sequence: Option<u64> = None;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if let Err(e) = send(&mut writer, HEARTBEAT, sequence).await {
                        tracing::warn!("Heartbeat failed: {}", e);
                        break;
                    }
                }
                frame = next_frame(&mut reader) => {
                    let frame = match frame {
                        Ok(Some(frame)) => frame,
                        Ok(None) => {
                            tracing::info!("Gateway closed by remote");
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Gateway read failed: {}", e);
                            break;
                        }
                    };

                    match frame.op {
                        DISPATCH => {
                            if frame.s.is_some() {
                                sequence = frame.s;
                            }
                            let Some(event_type) = frame.t else { continue };
                            match dispatch(&rest, &events, &event_type, frame.d) {
                                Ok(()) => {}
                                Err(BotError::Internal(_)) => break,
                                Err(e) => tracing::warn!("Dropping {} dispatch: {}", event_type, e),
                            }
                        }
                        HEARTBEAT => {
                            if let Err(e) = send(&mut writer, HEARTBEAT, sequence).await {
                                tracing::warn!("Heartbeat failed: {}", e);
                                break;
                            }
                        }
                        HEARTBEAT_ACK => {}
                        RECONNECT | INVALID_SESSION => {
                            tracing::info!("Gateway ended the session (opcode {})", frame.op);
                            break;
                        }
                        op => tracing::debug!("Ignoring gateway opcode {}", op),
                    }
                }
            }
        }

        let _ = writer.close().await;
        events.lock().unwrap_or_else(PoisonError::into_inner).take();
        tracing::info!("Gateway session ended");
    }
}

async fn send<T: Serialize>(writer: &mut WsSink, op: u8, d: T) -> Result<(), BotError> {
    let json = serde_json::to_string(&Outgoing { op, d }).map_err(|e| BotError::Parse(e.to_string()))?;
    writer
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| BotError::Network(format!("Gateway send failed: {}", e)))
}

/// Next JSON frame, or `None` once the socket closes
async fn next_frame(reader: &mut WsReader) -> Result<Option<Frame>, BotError> {
    while let Some(message) = reader.next().await {
        let message = message.map_err(|e| BotError::Network(e.to_string()))?;
        let text = match message {
            Message::Text(text) => text.to_string(),
            Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => continue,
            },
            Message::Close(_) => return Ok(None),
            _ => continue,
        };

        match serde_json::from_str(&text) {
            Ok(frame) => return Ok(Some(frame)),
            Err(e) => tracing::warn!("Ignoring malformed gateway frame: {}", e),
        }
    }
    Ok(None)
}
