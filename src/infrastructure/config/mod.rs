//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::AppSettings;
use crate::domain::entities::{GatewayIntent, Intents};

/// Maestro configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub application: ApplicationConfig,
    pub loaders: LoadersConfig,
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationConfig {
    pub name: String,
    /// Omitted means the minimal scope, with a warning at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intents: Option<Vec<GatewayIntent>>,
    #[serde(default)]
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SettingsConfig {
    pub debug: bool,
    pub defer_reply: bool,
    pub error_reply_grace_ms: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        let defaults = AppSettings::default();
        Self {
            debug: defaults.debug,
            defer_reply: defaults.defer_reply,
            error_reply_grace_ms: defaults.error_reply_grace.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoadersConfig {
    pub commands: Option<PathBuf>,
    pub events: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub discord: Option<DiscordConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub enabled: bool,
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

fn default_api_base() -> String {
    crate::infrastructure::adapters::discord::API_BASE.to_string()
}

fn default_gateway_url() -> String {
    crate::infrastructure::adapters::discord::GATEWAY_URL.to_string()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: None,
            api_base: default_api_base(),
            gateway_url: default_gateway_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application: ApplicationConfig {
                name: "maestro".to_string(),
                intents: Some(vec![GatewayIntent::Guilds, GatewayIntent::DirectMessages]),
                settings: SettingsConfig::default(),
            },
            loaders: LoadersConfig {
                commands: Some(PathBuf::from("./demos/commands")),
                events: Some(PathBuf::from("./demos/events")),
            },
            adapters: AdaptersConfig {
                discord: Some(DiscordConfig::default()),
                console: Some(ConsoleConfig { enabled: true }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.application.name.trim().is_empty() {
            return Err(ConfigError::MissingField("application.name".to_string()));
        }
        if let Some(discord) = &self.adapters.discord {
            if discord.enabled && !discord.api_base.starts_with("http") {
                return Err(ConfigError::InvalidValue(format!(
                    "adapters.discord.api-base: {}",
                    discord.api_base
                )));
            }
            if discord.enabled && !discord.gateway_url.starts_with("ws") {
                return Err(ConfigError::InvalidValue(format!(
                    "adapters.discord.gateway-url: {}",
                    discord.gateway_url
                )));
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> AppSettings {
        let settings = &self.application.settings;
        AppSettings {
            debug: settings.debug,
            defer_reply: settings.defer_reply,
            error_reply_grace: Duration::from_millis(settings.error_reply_grace_ms),
        }
    }

    pub fn intents(&self) -> Option<Intents> {
        self.application
            .intents
            .as_ref()
            .map(|list| list.iter().copied().collect())
    }

    /// Token configured for the Discord adapter, if it is enabled
    pub fn discord_token(&self) -> Option<String> {
        self.adapters
            .discord
            .as_ref()
            .filter(|d| d.enabled)
            .and_then(|d| d.token.clone())
    }

    pub fn discord_enabled(&self) -> bool {
        self.adapters.discord.as_ref().is_some_and(|d| d.enabled)
    }
}
