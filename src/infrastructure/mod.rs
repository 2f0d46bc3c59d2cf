//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Loaders: Directory-based command and event loading
//! - Adapters: Platform integrations (Discord, console)

pub mod config;
pub mod loaders;
pub mod adapters;
