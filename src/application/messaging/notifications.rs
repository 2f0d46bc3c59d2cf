//! Lifecycle notifications published by the application
//!
//! Listeners are delivered synchronously, in registration order. Nothing is
//! buffered: a listener only sees notifications emitted after it registered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::application::errors::CommandError;
use crate::application::Application;
use crate::domain::entities::{Command, Interaction};

pub type CommandErrorListener = Arc<dyn Fn(&CommandError, &Interaction, &Command) + Send + Sync>;
pub type CommandRegisteredListener = Arc<dyn Fn(&Command) + Send + Sync>;
pub type CommandsRegisteredListener = Arc<dyn Fn(&Application) + Send + Sync>;

/// Notification names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationEvent {
    CommandError,
    CommandRegistered,
    CommandsRegistered,
}

impl ApplicationEvent {
    pub fn as_str(&self) -> &str {
        match self {
            ApplicationEvent::CommandError => "commandError",
            ApplicationEvent::CommandRegistered => "commandRegistered",
            ApplicationEvent::CommandsRegistered => "commandsRegistered",
        }
    }
}

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Slot<L> = RwLock<Vec<(ListenerId, L)>>;

/// Listener registry
#[derive(Default)]
pub struct Notifications {
    next_id: AtomicU64,
    command_error: Slot<CommandErrorListener>,
    command_registered: Slot<CommandRegisteredListener>,
    commands_registered: Slot<CommandsRegisteredListener>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn on_command_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CommandError, &Interaction, &Command) + Send + Sync + 'static,
    {
        let id = self.next_id();
        let listener: CommandErrorListener = Arc::new(listener);
        push(&self.command_error, id, listener);
        id
    }

    pub fn on_command_registered<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Command) + Send + Sync + 'static,
    {
        let id = self.next_id();
        let listener: CommandRegisteredListener = Arc::new(listener);
        push(&self.command_registered, id, listener);
        id
    }

    pub fn on_commands_registered<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Application) + Send + Sync + 'static,
    {
        let id = self.next_id();
        let listener: CommandsRegisteredListener = Arc::new(listener);
        push(&self.commands_registered, id, listener);
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn off(&self, id: ListenerId) -> bool {
        remove(&self.command_error, id) || remove(&self.command_registered, id) || remove(&self.commands_registered, id)
    }

    pub fn listener_count(&self, event: ApplicationEvent) -> usize {
        match event {
            ApplicationEvent::CommandError => len(&self.command_error),
            ApplicationEvent::CommandRegistered => len(&self.command_registered),
            ApplicationEvent::CommandsRegistered => len(&self.commands_registered),
        }
    }

    pub fn emit_command_error(&self, error: &CommandError, interaction: &Interaction, command: &Command) {
        for listener in snapshot(&self.command_error) {
            listener(error, interaction, command);
        }
    }

    pub fn emit_command_registered(&self, command: &Command) {
        for listener in snapshot(&self.command_registered) {
            listener(command);
        }
    }

    pub fn emit_commands_registered(&self, app: &Application) {
        for listener in snapshot(&self.commands_registered) {
            listener(app);
        }
    }
}

fn push<L>(slot: &Slot<L>, id: ListenerId, listener: L) {
    slot.write().unwrap_or_else(PoisonError::into_inner).push((id, listener));
}

fn remove<L>(slot: &Slot<L>, id: ListenerId) -> bool {
    let mut listeners = slot.write().unwrap_or_else(PoisonError::into_inner);
    let before = listeners.len();
    listeners.retain(|(existing, _)| *existing != id);
    listeners.len() != before
}

fn len<L>(slot: &Slot<L>) -> usize {
    slot.read().unwrap_or_else(PoisonError::into_inner).len()
}

// Listeners run without the lock held so they may register or unregister.
fn snapshot<L: Clone>(slot: &Slot<L>) -> Vec<L> {
    slot.read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|(_, listener)| listener.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CommandData, CommandOptions, CommandResult};
    use std::sync::Mutex;

    async fn noop(_interaction: Interaction, _app: Application) -> CommandResult {
        Ok(())
    }

    fn command(name: &str) -> Command {
        Command::new(CommandOptions::new(CommandData::new(name, "test")).with_execute(noop)).unwrap()
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let notifications = Notifications::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        notifications.on_command_registered(move |c| first.lock().unwrap().push(format!("a:{}", c.name())));
        let second = seen.clone();
        notifications.on_command_registered(move |c| second.lock().unwrap().push(format!("b:{}", c.name())));

        notifications.emit_command_registered(&command("ping"));
        assert_eq!(*seen.lock().unwrap(), vec!["a:ping", "b:ping"]);
    }

    #[test]
    fn off_removes_only_the_given_listener() {
        let notifications = Notifications::new();
        let a = notifications.on_command_error(|_, _, _| {});
        let _b = notifications.on_command_error(|_, _, _| {});
        assert_eq!(notifications.listener_count(ApplicationEvent::CommandError), 2);

        assert!(notifications.off(a));
        assert!(!notifications.off(a));
        assert_eq!(notifications.listener_count(ApplicationEvent::CommandError), 1);
    }

    #[test]
    fn counts_are_per_event() {
        let notifications = Notifications::new();
        notifications.on_commands_registered(|_| {});
        assert_eq!(notifications.listener_count(ApplicationEvent::CommandError), 0);
        assert_eq!(notifications.listener_count(ApplicationEvent::CommandsRegistered), 1);
        assert_eq!(ApplicationEvent::CommandsRegistered.as_str(), "commandsRegistered");
    }
}
