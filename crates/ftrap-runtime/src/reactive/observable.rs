#![forbid(unsafe_code)]

//! Shared value with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] keeps its value in `Rc<RefCell<..>>`. Clones are handles
//! to the same cell, which is how a host hands its activation flag to an
//! `on_exit` callback while still reading it at commit time.
//!
//! Subscribers are held weakly. The strong side lives in the returned
//! [`Subscription`], so dropping the guard is the only way to unsubscribe and
//! a forgotten guard cannot keep a torn-down host alive through the cell.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: a subscriber that calls `set()` on the observable it
//!   is subscribed to panics on the `RefCell` borrow. Subscribers should only
//!   record that something changed (mark dirty) and let the owner act later.
//! - **Forgotten guards**: dead entries are pruned lazily on the next notify.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;
type WeakCallback<T> = Weak<dyn Fn(&T)>;

struct Cell<T> {
    value: T,
    version: u64,
    subscribers: Vec<WeakCallback<T>>,
}

/// A shared, version-tracked value.
///
/// Cloning creates another handle to the same value and subscriber list.
pub struct Observable<T> {
    cell: Rc<RefCell<Cell<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.borrow();
        f.debug_struct("Observable")
            .field("value", &cell.value)
            .field("version", &cell.version)
            .field("subscribers", &cell.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Wrap `value` at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(RefCell::new(Cell {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.cell.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow().value)
    }

    /// Store `value`. Returns whether it differed from the previous one.
    ///
    /// # Panics
    ///
    /// Panics if called from inside one of this observable's subscribers.
    pub fn set(&self, value: T) -> bool {
        {
            let mut cell = self.cell.borrow_mut();
            if cell.value == value {
                return false;
            }
            cell.value = value;
            cell.version += 1;
        }
        self.notify();
        true
    }

    /// Mutate in place. Subscribers run only if the value actually changed.
    ///
    /// # Panics
    ///
    /// Panics if called from inside one of this observable's subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        {
            let mut cell = self.cell.borrow_mut();
            let before = cell.value.clone();
            f(&mut cell.value);
            if cell.value == before {
                return false;
            }
            cell.version += 1;
        }
        self.notify();
        true
    }

    /// Call `callback` with the new value after every change.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Callback<T> = Rc::new(callback);
        self.cell
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.cell.borrow().subscribers.len()
    }

    /// Whether two handles share the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    fn notify(&self) {
        let (live, value): (Vec<Callback<T>>, T) = {
            let mut cell = self.cell.borrow_mut();
            cell.subscribers.retain(|w| w.strong_count() > 0);
            let live = cell.subscribers.iter().filter_map(|w| w.upgrade()).collect();
            (live, cell.value.clone())
        };
        for callback in &live {
            callback(&value);
        }
    }
}

/// Keeps a subscriber callback alive. Drop to unsubscribe.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
