//! Gateway intents - the notification categories a client subscribes to

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single gateway intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatewayIntent {
    Guilds,
    GuildMembers,
    GuildModeration,
    GuildEmojisAndStickers,
    GuildIntegrations,
    GuildWebhooks,
    GuildInvites,
    GuildVoiceStates,
    GuildPresences,
    GuildMessages,
    GuildMessageReactions,
    GuildMessageTyping,
    DirectMessages,
    DirectMessageReactions,
    DirectMessageTyping,
    MessageContent,
    GuildScheduledEvents,
    AutoModerationConfiguration,
    AutoModerationExecution,
}

impl GatewayIntent {
    pub fn bit(self) -> u64 {
        match self {
            GatewayIntent::Guilds => 1 << 0,
            GatewayIntent::GuildMembers => 1 << 1,
            GatewayIntent::GuildModeration => 1 << 2,
            GatewayIntent::GuildEmojisAndStickers => 1 << 3,
            GatewayIntent::GuildIntegrations => 1 << 4,
            GatewayIntent::GuildWebhooks => 1 << 5,
            GatewayIntent::GuildInvites => 1 << 6,
            GatewayIntent::GuildVoiceStates => 1 << 7,
            GatewayIntent::GuildPresences => 1 << 8,
            GatewayIntent::GuildMessages => 1 << 9,
            GatewayIntent::GuildMessageReactions => 1 << 10,
            GatewayIntent::GuildMessageTyping => 1 << 11,
            GatewayIntent::DirectMessages => 1 << 12,
            GatewayIntent::DirectMessageReactions => 1 << 13,
            GatewayIntent::DirectMessageTyping => 1 << 14,
            GatewayIntent::MessageContent => 1 << 15,
            GatewayIntent::GuildScheduledEvents => 1 << 16,
            GatewayIntent::AutoModerationConfiguration => 1 << 20,
            GatewayIntent::AutoModerationExecution => 1 << 21,
        }
    }
}

/// Set of gateway intents, stored as the platform bitfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Intents(u64);

impl Intents {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn with(mut self, intent: GatewayIntent) -> Self {
        self.0 |= intent.bit();
        self
    }

    pub fn contains(&self, intent: GatewayIntent) -> bool {
        self.0 & intent.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Scope used when the caller provides none
    pub fn minimal() -> Self {
        Self::empty()
            .with(GatewayIntent::Guilds)
            .with(GatewayIntent::DirectMessages)
    }
}

impl FromIterator<GatewayIntent> for Intents {
    fn from_iter<I: IntoIterator<Item = GatewayIntent>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Intents::with)
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
