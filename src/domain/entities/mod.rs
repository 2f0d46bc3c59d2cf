//! Domain entities - Commands, events and the interactions they respond to

pub mod user;
pub mod intents;
pub mod interaction;
pub mod command;
pub mod event;

pub use user::{Guild, User};
pub use intents::{GatewayIntent, Intents};
pub use interaction::{
    Interaction, InteractionData, InteractionKind, InteractionOption, InteractionResponse, ReplyMessage,
};
pub use command::{
    Command, CommandChoice, CommandData, CommandHandler, CommandOption, CommandOptionType, CommandOptions,
    CommandRegistry, CommandResult,
};
pub use event::{Event, EventHandler, EventOptions, EventRegistry};
