//! Commands queued from the UI boundary to whoever owns the item state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "text", rename_all = "snake_case")]
pub enum Command {
    Add,
    TextUpdate(String),
    Delete,
    List,
    Save(String),
}

impl Command {
    /// Stable short name, used as the `command` field in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::TextUpdate(_) => "text_update",
            Command::Delete => "delete",
            Command::List => "list",
            Command::Save(_) => "save",
        }
    }

    pub fn execute<R>(self, receiver: &R)
    where
        R: CommandReceiver + ?Sized,
    {
        match self {
            Command::Add => receiver.on_add(),
            Command::TextUpdate(text) => receiver.on_text_update(text),
            Command::Delete => receiver.on_delete(),
            Command::List => receiver.on_list(),
            Command::Save(text) => receiver.on_save(text),
        }
    }
}

/// Capability set a command is executed against.
///
/// Operations are synchronous entry points; receivers that need async work
/// spawn it themselves.
pub trait CommandReceiver {
    fn on_add(&self);
    fn on_text_update(&self, text: String);
    fn on_delete(&self);
    fn on_list(&self);
    fn on_save(&self, text: String);

    fn process_command(&self, command: Command) {
        dispatch(command, self);
    }
}

/// Invokes exactly one receiver operation for `command`.
pub fn dispatch<R>(command: Command, receiver: &R)
where
    R: CommandReceiver + ?Sized,
{
    command.execute(receiver);
}

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;
