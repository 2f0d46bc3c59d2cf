//! Token resolution and authorization state

use std::fmt;

use crate::application::errors::BotError;

/// Environment variable the binary reads the bot token from
pub const TOKEN_ENV: &str = "BOT_TOKEN";

/// Token candidates for the authorization handshake.
///
/// The environment token wins over the explicit one; empty strings count as
/// absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    env_token: Option<String>,
    explicit: Option<String>,
}

impl Credentials {
    pub fn new(env_token: Option<String>, explicit: Option<String>) -> Self {
        Self {
            env_token: env_token.filter(|t| !t.trim().is_empty()),
            explicit: explicit.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn explicit(token: impl Into<String>) -> Self {
        Self::new(None, Some(token.into()))
    }

    /// Read `BOT_TOKEN` once, falling back to `explicit`
    pub fn from_env(explicit: Option<String>) -> Self {
        Self::new(std::env::var(TOKEN_ENV).ok(), explicit)
    }

    pub fn resolve(&self) -> Result<&str, BotError> {
        self.env_token
            .as_deref()
            .or(self.explicit.as_deref())
            .ok_or(BotError::MissingToken)
    }

    pub fn is_empty(&self) -> bool {
        self.env_token.is_none() && self.explicit.is_none()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("env_token", &self.env_token.as_ref().map(|_| "<redacted>"))
            .field("explicit", &self.explicit.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Authorization state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthorized,
    /// Login in flight
    Authorizing,
    Authorized,
}

impl AuthState {
    pub fn as_str(&self) -> &str {
        match self {
            AuthState::Unauthorized => "unauthorized",
            AuthState::Authorizing => "authorizing",
            AuthState::Authorized => "authorized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_token_takes_precedence() {
        let credentials = Credentials::new(Some("env".to_string()), Some("arg".to_string()));
        assert_eq!(credentials.resolve().unwrap(), "env");
    }

    #[test]
    fn explicit_token_used_without_environment() {
        let credentials = Credentials::new(None, Some("arg".to_string()));
        assert_eq!(credentials.resolve().unwrap(), "arg");
    }

    #[test]
    fn no_token_is_an_error() {
        assert!(matches!(Credentials::default().resolve(), Err(BotError::MissingToken)));
        let blank = Credentials::new(Some("  ".to_string()), Some(String::new()));
        assert!(blank.is_empty());
        assert!(matches!(blank.resolve(), Err(BotError::MissingToken)));
    }

    #[test]
    fn debug_output_hides_tokens() {
        let credentials = Credentials::explicit("secret-token");
        assert!(!format!("{:?}", credentials).contains("secret-token"));
    }
}
