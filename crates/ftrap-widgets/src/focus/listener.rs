#![forbid(unsafe_code)]

//! Gesture listener registration.
//!
//! The engine only reacts to keys while registered. Registration is explicit
//! and idempotent: `start()` while listening and `stop()` while stopped are
//! no-ops, so every exit path out of `Active` can call `stop()` without
//! bookkeeping. Counters make the pairing checkable: whenever the listener is
//! stopped, `registrations() == deregistrations()`.

/// Registration guard for keyboard gesture handling.
#[derive(Debug, Default)]
pub struct GestureListener {
    listening: bool,
    registrations: u64,
    deregistrations: u64,
}

impl GestureListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register. Returns `false` if already registered.
    pub fn start(&mut self) -> bool {
        if self.listening {
            return false;
        }
        self.listening = true;
        self.registrations += 1;
        tracing::trace!(registrations = self.registrations, "gesture listener started");
        true
    }

    /// Deregister. Returns `false` if not registered.
    pub fn stop(&mut self) -> bool {
        if !self.listening {
            return false;
        }
        self.listening = false;
        self.deregistrations += 1;
        tracing::trace!(
            deregistrations = self.deregistrations,
            "gesture listener stopped"
        );
        true
    }

    #[inline]
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub fn registrations(&self) -> u64 {
        self.registrations
    }

    #[must_use]
    pub fn deregistrations(&self) -> u64 {
        self.deregistrations
    }
}

impl Drop for GestureListener {
    fn drop(&mut self) {
        if self.stop() {
            tracing::debug!("gesture listener released by drop");
        }
    }
}
