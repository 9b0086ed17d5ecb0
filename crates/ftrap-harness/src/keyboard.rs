#![forbid(unsafe_code)]

//! Key scripts.
//!
//! A compact text form for key sequences:
//!
//! | Script | Meaning |
//! |--------|---------|
//! | `abc` | press `a`, `b`, `c` |
//! | `{Escape}` | press a named key (DOM `key` names) |
//! | `{Shift>}` | hold a modifier until released |
//! | `{/Shift}` | release a held modifier |
//! | `{{` | a literal `{` |
//!
//! `{Shift>}{Tab}{/Shift}` is Shift+Tab.

use std::fmt;

use ftrap_core::{KeyCode, KeyEvent, Modifiers};

/// Why a key script could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScriptError {
    /// `{` without a closing `}`.
    Unterminated { offset: usize },
    /// A `{Name}` that is not a known key.
    UnknownKey(String),
    /// `{X>}` or `{/X}` where `X` is not a modifier.
    UnknownModifier(String),
}

impl fmt::Display for KeyScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated { offset } => write!(f, "unterminated key name at byte {offset}"),
            Self::UnknownKey(name) => write!(f, "unknown key: {name}"),
            Self::UnknownModifier(name) => write!(f, "unknown modifier: {name}"),
        }
    }
}

impl std::error::Error for KeyScriptError {}

fn modifier(name: &str) -> Result<Modifiers, KeyScriptError> {
    match name {
        "Shift" => Ok(Modifiers::SHIFT),
        "Control" | "Ctrl" => Ok(Modifiers::CTRL),
        "Alt" => Ok(Modifiers::ALT),
        "Meta" | "Super" => Ok(Modifiers::SUPER),
        other => Err(KeyScriptError::UnknownModifier(other.to_owned())),
    }
}

/// Parse a key script into press events.
///
/// # Errors
///
/// See [`KeyScriptError`].
pub fn parse_key_script(script: &str) -> Result<Vec<KeyEvent>, KeyScriptError> {
    let mut events = Vec::new();
    let mut held = Modifiers::NONE;
    let mut rest = script;
    let mut offset = 0;

    while let Some(c) = rest.chars().next() {
        if c != '{' {
            events.push(KeyEvent::new(KeyCode::Char(c)).with_modifiers(held));
            offset += c.len_utf8();
            rest = &rest[c.len_utf8()..];
            continue;
        }
        if let Some(after) = rest.strip_prefix("{{") {
            events.push(KeyEvent::new(KeyCode::Char('{')).with_modifiers(held));
            offset += 2;
            rest = after;
            continue;
        }
        let close = rest
            .find('}')
            .ok_or(KeyScriptError::Unterminated { offset })?;
        let name = &rest[1..close];
        if let Some(released) = name.strip_prefix('/') {
            held.remove(modifier(released)?);
        } else if let Some(pressed) = name.strip_suffix('>') {
            held.insert(modifier(pressed)?);
        } else {
            let code = KeyCode::from_dom_key(name)
                .ok_or_else(|| KeyScriptError::UnknownKey(name.to_owned()))?;
            events.push(KeyEvent::new(code).with_modifiers(held));
        }
        offset += close + 1;
        rest = &rest[close + 1..];
    }
    Ok(events)
}
