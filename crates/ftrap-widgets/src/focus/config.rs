#![forbid(unsafe_code)]

//! Trap configuration.

use ftrap_core::KeyCode;

/// Behaviour switches for a [`FocusTrapEngine`](super::FocusTrapEngine).
///
/// The defaults give the classic modal trap: wrap at both ends, Escape asks
/// the host to close, and Tab pulls stray focus back inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapConfig {
    /// Wrap last→first and first→last. When off, the boundary advance is
    /// still suppressed but focus stays where it is.
    pub wrap: bool,
    /// Key that signals exit; `None` disables exit signaling.
    pub exit_key: Option<KeyCode>,
    /// Redirect Tab to the first element when focus is outside the container.
    pub redirect_outside: bool,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            wrap: true,
            exit_key: Some(KeyCode::Escape),
            redirect_outside: true,
        }
    }
}

impl TrapConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub fn with_exit_key(mut self, key: Option<KeyCode>) -> Self {
        self.exit_key = key;
        self
    }

    #[must_use]
    pub fn with_redirect_outside(mut self, redirect: bool) -> Self {
        self.redirect_outside = redirect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_classic_modal_trap() {
        let config = TrapConfig::default();
        assert!(config.wrap);
        assert_eq!(config.exit_key, Some(KeyCode::Escape));
        assert!(config.redirect_outside);
        assert_eq!(config, TrapConfig::new());
    }

    #[test]
    fn builders_override_fields() {
        let config = TrapConfig::new()
            .with_wrap(false)
            .with_exit_key(Some(KeyCode::Char('q')))
            .with_redirect_outside(false);
        assert!(!config.wrap);
        assert_eq!(config.exit_key, Some(KeyCode::Char('q')));
        assert!(!config.redirect_outside);
    }
}
