use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::application::errors::{CommandError, ConstructionError};
use crate::application::Application;
use crate::domain::entities::Interaction;

/// Command and option names accepted by the platform
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-_a-z0-9]{1,32}$").expect("static pattern is valid")
});

const MAX_DESCRIPTION_LEN: usize = 100;
const MAX_OPTIONS: usize = 25;
const MAX_CHOICES: usize = 25;

/// Chat-input command type on the wire
const CHAT_INPUT: u8 = 1;

/// Result returned by a command's execute callback
pub type CommandResult = Result<(), CommandError>;

/// Execute callback for a command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, interaction: Interaction, app: Application) -> CommandResult;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(Interaction, Application) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    async fn execute(&self, interaction: Interaction, app: Application) -> CommandResult {
        (self)(interaction, app).await
    }
}

/// Option value types understood by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "OptionTypeRepr")]
pub enum CommandOptionType {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl CommandOptionType {
    pub fn code(self) -> u8 {
        match self {
            CommandOptionType::SubCommand => 1,
            CommandOptionType::SubCommandGroup => 2,
            CommandOptionType::String => 3,
            CommandOptionType::Integer => 4,
            CommandOptionType::Boolean => 5,
            CommandOptionType::User => 6,
            CommandOptionType::Channel => 7,
            CommandOptionType::Role => 8,
            CommandOptionType::Mentionable => 9,
            CommandOptionType::Number => 10,
            CommandOptionType::Attachment => 11,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        let kind = match code {
            1 => CommandOptionType::SubCommand,
            2 => CommandOptionType::SubCommandGroup,
            3 => CommandOptionType::String,
            4 => CommandOptionType::Integer,
            5 => CommandOptionType::Boolean,
            6 => CommandOptionType::User,
            7 => CommandOptionType::Channel,
            8 => CommandOptionType::Role,
            9 => CommandOptionType::Mentionable,
            10 => CommandOptionType::Number,
            11 => CommandOptionType::Attachment,
            _ => return None,
        };
        Some(kind)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "sub-command" | "subcommand" => CommandOptionType::SubCommand,
            "sub-command-group" | "subcommand-group" => CommandOptionType::SubCommandGroup,
            "string" => CommandOptionType::String,
            "integer" => CommandOptionType::Integer,
            "boolean" => CommandOptionType::Boolean,
            "user" => CommandOptionType::User,
            "channel" => CommandOptionType::Channel,
            "role" => CommandOptionType::Role,
            "mentionable" => CommandOptionType::Mentionable,
            "number" => CommandOptionType::Number,
            "attachment" => CommandOptionType::Attachment,
            _ => return None,
        };
        Some(kind)
    }
}

impl From<CommandOptionType> for u8 {
    fn from(kind: CommandOptionType) -> u8 {
        kind.code()
    }
}

/// Manifests may spell option types by name; the wire always uses the code
#[derive(Deserialize)]
#[serde(untagged)]
enum OptionTypeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<OptionTypeRepr> for CommandOptionType {
    type Error = String;

    fn try_from(repr: OptionTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            OptionTypeRepr::Code(code) => CommandOptionType::from_code(code)
                .ok_or_else(|| format!("unknown option type code {}", code)),
            OptionTypeRepr::Name(name) => CommandOptionType::from_name(&name.to_lowercase())
                .ok_or_else(|| format!("unknown option type '{}'", name)),
        }
    }
}

/// A predefined value the user can pick for an option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandChoice {
    pub name: String,
    pub value: serde_json::Value,
}

impl CommandChoice {
    pub fn new(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A parameter of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: CommandOptionType,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CommandChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
}

impl CommandOption {
    pub fn new(kind: CommandOptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(CommandOptionType::String, name, description)
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(CommandOptionType::Integer, name, description)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(CommandOptionType::Boolean, name, description)
    }

    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(CommandOptionType::User, name, description)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_choice(mut self, choice: CommandChoice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate_naming(&self.name, &self.description)?;
        if self.choices.len() > MAX_CHOICES {
            return Err(ConstructionError::InvalidData(format!(
                "option '{}' has more than {} choices",
                self.name, MAX_CHOICES
            )));
        }
        if self.options.len() > MAX_OPTIONS {
            return Err(ConstructionError::InvalidData(format!(
                "option '{}' has more than {} sub-options",
                self.name, MAX_OPTIONS
            )));
        }
        self.options.iter().try_for_each(CommandOption::validate)
    }
}

/// Declarative description of a command, sent to the platform as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub name: String,
    pub description: String,
    #[serde(rename = "type", default = "chat_input")]
    pub kind: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
}

fn chat_input() -> u8 {
    CHAT_INPUT
}

impl CommandData {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CHAT_INPUT,
            options: Vec::new(),
            default_member_permissions: None,
            dm_permission: None,
            nsfw: None,
        }
    }

    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_default_member_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.default_member_permissions = Some(permissions.into());
        self
    }

    pub fn with_dm_permission(mut self, allowed: bool) -> Self {
        self.dm_permission = Some(allowed);
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Check the payload against the platform's naming and size limits
    pub fn validate(&self) -> Result<(), ConstructionError> {
        validate_naming(&self.name, &self.description)?;
        if self.options.len() > MAX_OPTIONS {
            return Err(ConstructionError::InvalidData(format!(
                "command '{}' has more than {} options",
                self.name, MAX_OPTIONS
            )));
        }
        self.options.iter().try_for_each(CommandOption::validate)
    }
}

fn validate_naming(name: &str, description: &str) -> Result<(), ConstructionError> {
    if !NAME_PATTERN.is_match(name) {
        return Err(ConstructionError::InvalidData(format!(
            "'{}' is not a valid name (1-32 lowercase letters, digits, '-' or '_')",
            name
        )));
    }
    let len = description.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_LEN {
        return Err(ConstructionError::InvalidData(format!(
            "description of '{}' must be 1-{} characters",
            name, MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

/// Options used to build a [`Command`]
pub struct CommandOptions {
    pub data: CommandData,
    pub execute: Option<Arc<dyn CommandHandler>>,
}

impl CommandOptions {
    pub fn new(data: CommandData) -> Self {
        Self { data, execute: None }
    }

    pub fn with_execute<F, Fut>(self, execute: F) -> Self
    where
        F: Fn(Interaction, Application) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.with_handler(Arc::new(execute))
    }

    pub fn with_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.execute = Some(handler);
        self
    }
}

/// An executable command
#[derive(Clone)]
pub struct Command {
    data: CommandData,
    execute: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(options: CommandOptions) -> Result<Self, ConstructionError> {
        let execute = options.execute.ok_or(ConstructionError::MissingExecute)?;
        Ok(Self {
            data: options.data,
            execute,
        })
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Description payload registered with the platform
    pub fn data(&self) -> &CommandData {
        &self.data
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.execute
    }

    /// Copy of this command registered under another name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut data = self.data.clone();
        data.set_name(name);
        Self {
            data,
            execute: Arc::clone(&self.execute),
        }
    }

    pub async fn execute(&self, interaction: Interaction, app: Application) -> CommandResult {
        self.execute.execute(interaction, app).await
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.data.name)
            .field("description", &self.data.description)
            .finish_non_exhaustive()
    }
}

/// Command registry keyed by name
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under the same name replace earlier ones
    pub fn register(&mut self, command: Command) {
        if let Some(previous) = self.commands.insert(command.name().to_string(), Arc::new(command)) {
            tracing::debug!("Command /{} replaced by a later registration", previous.name());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Command>> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<Command> for CommandRegistry {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut registry = Self::new();
        for command in iter {
            registry.register(command);
        }
        registry
    }
}
