//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod rest;

pub use client::{BotInfo, Client, GatewayEvent, InteractionResponder};
pub use rest::RestApi;
