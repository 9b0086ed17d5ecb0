#![forbid(unsafe_code)]

//! Change-tracking primitives.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order, after the borrow on the
//!    value has been released.
//! 3. Setting a value equal to the current value is a no-op.
//! 4. Dropping a [`Subscription`] stops its callback before the next
//!    notification.

pub mod binding;
pub mod observable;

pub use binding::RefBinding;
pub use observable::{Observable, Subscription};
