#![forbid(unsafe_code)]

//! Focus trapping: resolver, engine, and host adapter.

pub mod config;
pub mod diagnostic;
pub mod host;
pub mod listener;
pub mod resolver;
pub mod trap;

pub use config::TrapConfig;
pub use diagnostic::{HandleRole, TrapDiagnostic};
pub use host::FocusTrapHost;
pub use listener::GestureListener;
pub use resolver::{FocusableSet, FocusableSetResolver};
pub use trap::{
    ActivationState, EnterHook, ExitHook, FocusTrapEngine, Gesture, GestureOutcome, TrapEvent,
};
