//! Message handling - Interaction dispatch and lifecycle notifications

pub mod dispatcher;
pub mod notifications;

pub use dispatcher::{GENERIC_ERROR_NOTICE, GENERIC_ERROR_REPLY};
pub use notifications::{ApplicationEvent, ListenerId, Notifications};
