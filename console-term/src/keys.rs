//! Keyboard mapping
//!
//! Translates winit key events into console edit actions.

use console_core::EditAction;
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// What a key press asks the host to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    /// Apply one edit action
    Edit(EditAction),
    /// Type each character of the text
    Text(String),
    /// Close the window
    Close,
}

impl KeyCommand {
    /// Edit actions this command expands to
    pub fn actions(&self) -> Vec<EditAction> {
        match self {
            KeyCommand::Edit(action) => vec![*action],
            KeyCommand::Text(text) => text.chars().map(EditAction::Type).collect(),
            KeyCommand::Close => Vec::new(),
        }
    }
}

/// Map a pressed key to a command. `text` is the text the key produced, if
/// any.
pub fn map_key(key: &Key, text: Option<&str>, modifiers: ModifiersState) -> Option<KeyCommand> {
    if let Key::Named(named) = key {
        let action = match named {
            NamedKey::Home => EditAction::Home,
            NamedKey::End => EditAction::End,
            NamedKey::Delete => EditAction::Delete,
            NamedKey::Backspace => EditAction::Backspace,
            NamedKey::Tab => EditAction::Complete,
            NamedKey::Enter => EditAction::Enter,
            NamedKey::ArrowUp => EditAction::HistoryPrev,
            NamedKey::ArrowDown => EditAction::HistoryNext,
            NamedKey::ArrowLeft => EditAction::Left,
            NamedKey::ArrowRight => EditAction::Right,
            NamedKey::Escape => return Some(KeyCommand::Close),
            NamedKey::Space if !modifiers.control_key() => EditAction::Type(' '),
            _ => return None,
        };
        return Some(KeyCommand::Edit(action));
    }

    if modifiers.control_key() {
        let Key::Character(c) = key else {
            return None;
        };
        let action = match c.to_lowercase().as_str() {
            "k" => EditAction::Kill,
            "l" => EditAction::Clear,
            "y" => EditAction::Yank,
            _ => return None,
        };
        return Some(KeyCommand::Edit(action));
    }

    let text: String = text?.chars().filter(|c| !c.is_control()).collect();
    if text.is_empty() {
        return None;
    }
    Some(KeyCommand::Text(text))
}
