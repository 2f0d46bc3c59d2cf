//! Application layer - The dispatch core
//!
//! This layer contains:
//! - App: the Application handle and its authorization handshake
//! - Auth: token resolution and authorization state
//! - Errors: Domain-specific errors
//! - Messaging: interaction dispatch, notifications

pub mod app;
pub mod auth;
pub mod errors;
pub mod messaging;

pub use app::{AppSettings, Application, ApplicationOptions, DEFAULT_ERROR_REPLY_GRACE};
pub use auth::{AuthState, Credentials, TOKEN_ENV};
