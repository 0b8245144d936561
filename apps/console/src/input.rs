//! Line-oriented front end: turns typed lines into commands.

use shared::command::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Dispatch(Command),
    Quit,
    Empty,
    Unknown(String),
}

/// Text field contents; `edit` replaces it and a bare `save` uses it.
#[derive(Debug, Clone)]
pub struct Draft {
    text: String,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parse_line(&mut self, line: &str) -> Input {
        let line = line.trim();
        if line.is_empty() {
            return Input::Empty;
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "add" => Input::Dispatch(Command::Add),
            "delete" => Input::Dispatch(Command::Delete),
            "list" => Input::Dispatch(Command::List),
            "edit" | "update" => {
                if !rest.is_empty() {
                    self.text = rest.to_string();
                }
                Input::Dispatch(Command::TextUpdate(self.text.clone()))
            }
            "save" => {
                let text = if rest.is_empty() {
                    self.text.clone()
                } else {
                    rest.to_string()
                };
                Input::Dispatch(Command::Save(text))
            }
            "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}
