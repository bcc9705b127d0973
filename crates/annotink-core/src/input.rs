//! Keyboard and pointer input types handed to the editor by the host.

use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only Ctrl held.
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// The action modifier: Ctrl, or Cmd on macOS keyboards.
    pub fn action_mod(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Enter,
    /// A printable character.
    Character(char),
}

impl Key {
    /// Parse a host key name (`"Delete"`, `"Escape"`, `"a"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Delete" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            "Escape" => Some(Key::Escape),
            "Enter" => Some(Key::Enter),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Character(c)),
                    _ => None,
                }
            }
        }
    }

    /// Whether this is `c`, ignoring case.
    pub fn is_char(&self, c: char) -> bool {
        matches!(self, Key::Character(k) if k.eq_ignore_ascii_case(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Delete"), Some(Key::Delete));
        assert_eq!(Key::from_name("a"), Some(Key::Character('a')));
        assert_eq!(Key::from_name("F12"), None);
        assert!(Key::Character('Z').is_char('z'));
    }

    #[test]
    fn test_action_mod() {
        assert!(Modifiers::CTRL.action_mod());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.action_mod());
        assert!(!Modifiers::NONE.with_shift().action_mod());
    }
}
