#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Hosts translate whatever their platform delivers (DOM `keydown`, terminal
//! escape sequences) into [`Event`] values. Trap engines only look at
//! [`KeyEvent`]s; window focus changes matter to the reference document.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE = 0;
        const SHIFT = 0b0001;
        const ALT = 0b0010;
        const CTRL = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Logical key identity, independent of layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    /// Shift+Tab as reported by terminals that fold the modifier into the key.
    BackTab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
}

impl KeyCode {
    /// Parse a DOM `KeyboardEvent.key` value.
    ///
    /// Single-character values become [`KeyCode::Char`]. Unknown names yield
    /// `None`.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Option<Self> {
        let code = match key {
            "Tab" => Self::Tab,
            "Escape" | "Esc" => Self::Escape,
            "Enter" => Self::Enter,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Insert" => Self::Insert,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            " " => Self::Char(' '),
            other => {
                if let Some(n) = other.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                    return (1..=24).contains(&n).then_some(Self::F(n));
                }
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }
}

/// Phase of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A single keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    #[inline]
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[inline]
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Press or auto-repeat; releases never drive focus.
    #[inline]
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Input delivered by the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Window focus changed. `false` means focus moved to something outside
    /// the document (browser chrome, another application).
    Focus(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_key_names() {
        assert_eq!(KeyCode::from_dom_key("Tab"), Some(KeyCode::Tab));
        assert_eq!(KeyCode::from_dom_key("Escape"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_dom_key("Esc"), Some(KeyCode::Escape));
        assert_eq!(KeyCode::from_dom_key("ArrowLeft"), Some(KeyCode::Left));
        assert_eq!(KeyCode::from_dom_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(KeyCode::from_dom_key("a"), Some(KeyCode::Char('a')));
        assert_eq!(KeyCode::from_dom_key(" "), Some(KeyCode::Char(' ')));
    }

    #[test]
    fn unknown_dom_keys() {
        assert_eq!(KeyCode::from_dom_key("Hyper"), None);
        assert_eq!(KeyCode::from_dom_key(""), None);
        assert_eq!(KeyCode::from_dom_key("F99"), None);
    }

    #[test]
    fn modifier_accessors() {
        let ev = KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
        assert!(ev.shift());
        assert!(ev.ctrl());
        assert!(!ev.alt());
    }

    #[test]
    fn release_is_not_press() {
        let ev = KeyEvent::new(KeyCode::Tab).with_kind(KeyEventKind::Release);
        assert!(!ev.is_press());
        assert!(KeyEvent::new(KeyCode::Tab).is_press());
        assert!(
            KeyEvent::new(KeyCode::Tab)
                .with_kind(KeyEventKind::Repeat)
                .is_press()
        );
    }

    #[test]
    fn from_code_has_no_modifiers() {
        let ev: KeyEvent = KeyCode::Escape.into();
        assert_eq!(ev.modifiers, Modifiers::NONE);
        assert_eq!(ev.kind, KeyEventKind::Press);
    }
}
