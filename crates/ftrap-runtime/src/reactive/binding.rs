#![forbid(unsafe_code)]

//! Late-bound references.
//!
//! A [`RefBinding`] is the Rust shape of a UI framework "ref": a slot that is
//! empty when the owning component is constructed and is filled once the
//! referenced element has actually been rendered. Consumers must not assume
//! the slot is filled; they subscribe to [`RefBinding::on_change`] or re-check
//! [`RefBinding::current`] at commit time.
//!
//! The binding stores a copyable handle, never the target itself, so it never
//! keeps a detached element alive.

use std::fmt;

use super::observable::{Observable, Subscription};

/// A late-bound, observable handle slot.
pub struct RefBinding<T> {
    slot: Observable<Option<T>>,
    attachments: Observable<u64>,
}

impl<T> Clone for RefBinding<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            attachments: self.attachments.clone(),
        }
    }
}

impl<T: fmt::Debug + Clone + PartialEq + 'static> fmt::Debug for RefBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefBinding")
            .field("current", &self.slot.get())
            .field("attachments", &self.attachments.get())
            .finish()
    }
}

impl<T: Copy + PartialEq + fmt::Debug + 'static> Default for RefBinding<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq + fmt::Debug + 'static> RefBinding<T> {
    /// An empty binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Observable::new(None),
            attachments: Observable::new(0),
        }
    }

    /// The bound handle, if the target has been attached.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.slot.get()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.slot.with(Option::is_some)
    }

    /// Publish that `target` is now available.
    ///
    /// Re-attaching the same handle is a no-op. Returns whether the binding
    /// changed.
    pub fn attach(&self, target: T) -> bool {
        let changed = self.slot.set(Some(target));
        if changed {
            self.attachments.update(|n| *n += 1);
            tracing::trace!(?target, "ref attached");
        }
        changed
    }

    /// Clear the binding. Returns the handle that was bound.
    pub fn detach(&self) -> Option<T> {
        let previous = self.slot.get();
        if self.slot.set(None) {
            tracing::trace!(?previous, "ref detached");
        }
        previous
    }

    /// How many times a new target has been attached.
    #[must_use]
    pub fn attach_count(&self) -> u64 {
        self.attachments.get()
    }

    /// Version of the underlying slot; bumps on every attach or detach.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.version()
    }

    /// Subscribe to attach/detach transitions.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_change(&self, callback: impl Fn(Option<T>) + 'static) -> Subscription {
        self.slot.subscribe(move |value| callback(*value))
    }
}
