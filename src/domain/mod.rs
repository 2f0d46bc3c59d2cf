//! Domain layer - Core types with no transport concerns
//!
//! This layer contains:
//! - Entities: Commands, events, interactions, intents
//! - Traits: Abstractions for the platform client, responder and REST API

pub mod entities;
pub mod traits;
