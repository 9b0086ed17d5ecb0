#![forbid(unsafe_code)]

//! Runtime glue for ftrap hosts.
//!
//! Hosts rarely own every piece of state a focus trap depends on. The
//! activation flag usually belongs to a dialog component, and the container
//! element only exists once that component has rendered. This crate provides
//! the change-tracked values hosts use to publish both:
//!
//! - [`Observable`]: a shared, version-tracked value with subscribers.
//! - [`RefBinding`]: a late-bound reference that announces when its target
//!   becomes available.

pub mod reactive;

pub use reactive::{Observable, RefBinding, Subscription};
