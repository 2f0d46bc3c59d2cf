//! Platform adapters

pub mod console;
pub mod discord;

pub use console::ConsoleClient;
pub use discord::DiscordClient;
