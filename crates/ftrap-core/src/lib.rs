#![forbid(unsafe_code)]

//! Core: input events, the element tree, and the focus surface seam.
//!
//! # Role in ftrap
//! `ftrap-core` is the input and tree layer. It owns the normalized key event
//! types that trap engines classify, the [`FocusSurface`] trait through which
//! engines observe and move focus, and [`Document`], an in-memory element tree
//! that behaves like a browser document for focus purposes.
//!
//! # Primary responsibilities
//! - **Event**: canonical keyboard and window-focus events.
//! - **Document**: arena tree with generation-checked handles, attributes,
//!   a single active element, and native sequential (Tab key) navigation.
//! - **FocusSurface**: the read/focus contract consumed by `ftrap-widgets`.
//!
//! # How it fits in the system
//! `ftrap-widgets` never owns the tree. Every engine call borrows a surface
//! for its duration, so handles held between calls are observational only and
//! must be re-validated.

pub mod event;
pub mod logging;
pub mod surface;
pub mod tree;

pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use surface::FocusSurface;
pub use tree::{Document, ElementId, Tag, TreeError};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
