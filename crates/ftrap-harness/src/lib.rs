#![forbid(unsafe_code)]

//! Interaction harness for ftrap.
//!
//! Drives an [`App`] the way a user would: clicks, key presses, and window
//! focus changes go through the trap first, then the document's native Tab
//! behaviour, then a render pass and a trap commit. Tests assert on the
//! resulting focus.
//!
//! - [`Session`]: owns the document and the app, records a transcript.
//! - [`keyboard`]: `{Escape}`-style key scripts.
//! - [`fixtures`]: reference apps (a toggleable dialog and a conditionally
//!   rendered trap).

pub mod fixtures;
pub mod keyboard;
pub mod session;

pub use keyboard::{KeyScriptError, parse_key_script};
pub use session::{App, HarnessError, KeyReport, Session};
