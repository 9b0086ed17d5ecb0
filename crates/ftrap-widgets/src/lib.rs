#![forbid(unsafe_code)]

//! Focus-trap behaviour for ftrap.
//!
//! # Role in ftrap
//! `ftrap-widgets` holds the trap itself. It reads the tree only through
//! [`ftrap_core::FocusSurface`], so the same engine drives the in-memory
//! [`ftrap_core::Document`] in tests and any real UI tree behind that trait.
//!
//! - [`focus::FocusableSetResolver`]: which descendants of a container can
//!   take focus, in document order.
//! - [`focus::FocusTrapEngine`]: activation state machine, Tab/Shift+Tab
//!   wrapping, exit signaling, capture and restore of the previous focus.
//! - [`focus::FocusTrapHost`]: adapter that waits for a late-bound container
//!   before activating the engine.

pub mod focus;

pub use focus::{
    ActivationState, FocusTrapEngine, FocusTrapHost, FocusableSet, FocusableSetResolver, Gesture,
    GestureListener, GestureOutcome, TrapConfig, TrapDiagnostic, TrapEvent,
};
