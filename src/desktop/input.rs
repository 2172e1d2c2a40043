//! Mouse buttons and key names
//!
//! Keys can be built directly or parsed from the names people type in
//! configs and hotkey strings ("ctrl", "cmd", "pagedown", "a").

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AutomationError;

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

impl FromStr for MouseButton {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            "x1" | "back" => Ok(MouseButton::X1),
            "x2" | "forward" => Ok(MouseButton::X2),
            other => Err(AutomationError::InvalidButton(other.to_string())),
        }
    }
}

/// A keyboard key: either a named non-character key or a character key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    // Editing
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,
    Insert,

    // Modifiers
    Shift,
    Control,
    Alt,
    /// Command on macOS, Windows key on Windows, Super elsewhere
    Meta,

    // Navigation
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,

    // Locks and specials
    CapsLock,
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,

    /// Any key that produces a character ("a", "7", "/", "é")
    Char(char),
}

/// Modifier keys scanned by `Keyboard::modifiers`, in report order
pub const MODIFIER_KEYS: [Key; 4] = [Key::Shift, Key::Control, Key::Alt, Key::Meta];

impl Key {
    pub fn is_modifier(&self) -> bool {
        MODIFIER_KEYS.contains(self)
    }

    fn function_key(n: u8) -> Option<Key> {
        const KEYS: [Key; 20] = [
            Key::F1, Key::F2, Key::F3, Key::F4, Key::F5,
            Key::F6, Key::F7, Key::F8, Key::F9, Key::F10,
            Key::F11, Key::F12, Key::F13, Key::F14, Key::F15,
            Key::F16, Key::F17, Key::F18, Key::F19, Key::F20,
        ];
        KEYS.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// Canonical lowercase name, the inverse of parsing.
    pub fn name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            other => {
                let json = serde_json::to_value(other).unwrap_or_default();
                json.as_str().unwrap_or_default().to_string()
            }
        }
    }
}

impl FromStr for Key {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c.to_ascii_lowercase()));
        }

        let lower = trimmed.to_lowercase();
        let key = match lower.as_str() {
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "backspace" | "bs" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "escape" | "esc" => Key::Escape,
            "insert" | "ins" => Key::Insert,
            "shift" => Key::Shift,
            "ctrl" | "control" => Key::Control,
            "alt" | "option" => Key::Alt,
            "meta" | "cmd" | "command" | "win" | "windows" | "super" => Key::Meta,
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "capslock" => Key::CapsLock,
            "numlock" => Key::NumLock,
            "scrolllock" => Key::ScrollLock,
            "printscreen" | "prtsc" => Key::PrintScreen,
            "pause" => Key::Pause,
            f if f.starts_with('f') => f[1..]
                .parse::<u8>()
                .ok()
                .and_then(Key::function_key)
                .ok_or_else(|| AutomationError::InvalidKey(s.to_string()))?,
            _ => return Err(AutomationError::InvalidKey(s.to_string())),
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

/// Parse a `+`-separated combination such as "Ctrl+Shift+S".
pub fn parse_combo(combo: &str) -> Result<Vec<Key>, AutomationError> {
    combo
        .split('+')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<Key>)
        .collect()
}

#[cfg(feature = "native")]
impl MouseButton {
    pub(crate) fn to_enigo(self) -> enigo::Button {
        match self {
            MouseButton::Left => enigo::Button::Left,
            MouseButton::Right => enigo::Button::Right,
            MouseButton::Middle => enigo::Button::Middle,
            MouseButton::X1 => enigo::Button::Back,
            MouseButton::X2 => enigo::Button::Forward,
        }
    }
}

#[cfg(feature = "native")]
impl Key {
    pub(crate) fn to_enigo(self) -> enigo::Key {
        use enigo::Key as E;
        match self {
            Key::Enter => E::Return,
            Key::Tab => E::Tab,
            Key::Space => E::Space,
            Key::Backspace => E::Backspace,
            Key::Delete => E::Delete,
            Key::Escape => E::Escape,
            Key::Insert => E::Insert,
            Key::Shift => E::Shift,
            Key::Control => E::Control,
            Key::Alt => E::Alt,
            Key::Meta => E::Meta,
            Key::Left => E::LeftArrow,
            Key::Right => E::RightArrow,
            Key::Up => E::UpArrow,
            Key::Down => E::DownArrow,
            Key::Home => E::Home,
            Key::End => E::End,
            Key::PageUp => E::PageUp,
            Key::PageDown => E::PageDown,
            Key::CapsLock => E::CapsLock,
            Key::NumLock => E::Numlock,
            #[cfg(target_os = "windows")]
            Key::ScrollLock => E::Other(0x91), // VK_SCROLL
            #[cfg(not(target_os = "windows"))]
            Key::ScrollLock => E::Other(0xff14), // XK_Scroll_Lock
            Key::PrintScreen => E::Print,
            Key::Pause => E::Pause,
            Key::F1 => E::F1,
            Key::F2 => E::F2,
            Key::F3 => E::F3,
            Key::F4 => E::F4,
            Key::F5 => E::F5,
            Key::F6 => E::F6,
            Key::F7 => E::F7,
            Key::F8 => E::F8,
            Key::F9 => E::F9,
            Key::F10 => E::F10,
            Key::F11 => E::F11,
            Key::F12 => E::F12,
            Key::F13 => E::F13,
            Key::F14 => E::F14,
            Key::F15 => E::F15,
            Key::F16 => E::F16,
            Key::F17 => E::F17,
            Key::F18 => E::F18,
            Key::F19 => E::F19,
            Key::F20 => E::F20,
            Key::Char(c) => E::Unicode(c),
        }
    }
}
