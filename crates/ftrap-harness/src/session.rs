#![forbid(unsafe_code)]

//! Interaction sessions.
//!
//! # Dispatch order
//!
//! Every input goes through the same pipeline:
//!
//! 1. The trap, if the app has one and it is listening.
//! 2. The document's native action, unless the trap consumed the key
//!    (Tab/Shift+Tab advance focus, a click focuses its target).
//! 3. [`App::update`], the render pass.
//! 4. [`FocusTrapHost::commit`], so activation changes land after the tree
//!    reflects the new state.

use std::fmt;

use ftrap_core::{Document, ElementId, Event, KeyCode, KeyEvent, Modifiers, TreeError};
use ftrap_widgets::{FocusTrapHost, GestureOutcome};
use serde_json::json;

use crate::keyboard::{KeyScriptError, parse_key_script};

/// An application under test.
pub trait App {
    /// Build the initial tree.
    fn mount(&mut self, doc: &mut Document) -> Result<(), TreeError>;

    /// Bring the tree in line with current state.
    fn update(&mut self, doc: &mut Document) -> Result<(), TreeError>;

    /// A click landed on `target` after it took focus.
    fn on_click(&mut self, _doc: &mut Document, _target: ElementId) {}

    /// The app's focus trap, if any.
    fn trap(&mut self) -> Option<&mut FocusTrapHost> {
        None
    }
}

/// Session failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    Tree(TreeError),
    KeyScript(KeyScriptError),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(e) => write!(f, "tree: {e}"),
            Self::KeyScript(e) => write!(f, "key script: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(e) => Some(e),
            Self::KeyScript(e) => Some(e),
        }
    }
}

impl From<TreeError> for HarnessError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

impl From<KeyScriptError> for HarnessError {
    fn from(e: KeyScriptError) -> Self {
        Self::KeyScript(e)
    }
}

/// What happened to one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyReport {
    pub key: KeyEvent,
    /// Trap verdict, `None` when the app has no trap.
    pub outcome: Option<GestureOutcome>,
    /// The native action ran.
    pub native: bool,
    /// Focus after the full pipeline.
    pub focused: Option<ElementId>,
}

/// A mounted app plus its document.
#[derive(Debug)]
pub struct Session<A: App> {
    doc: Document,
    app: A,
    transcript: Vec<KeyReport>,
}

impl<A: App> Session<A> {
    /// Mount `app` into a fresh document and run the first render and commit.
    ///
    /// # Errors
    ///
    /// Propagates tree errors from `mount` or `update`.
    pub fn mount(mut app: A) -> Result<Self, HarnessError> {
        let mut doc = Document::new();
        app.mount(&mut doc)?;
        let mut session = Self {
            doc,
            app,
            transcript: Vec::new(),
        };
        session.settle()?;
        Ok(session)
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct tree access for mutations a test wants to inject.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[must_use]
    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    #[must_use]
    pub fn focused(&self) -> Option<ElementId> {
        self.doc.active_element()
    }

    /// Programmatic focus, like calling `focus()` from a script.
    pub fn focus(&mut self, target: ElementId) -> bool {
        self.doc.focus(target)
    }

    /// Click `target`: focus it, run the app's handler, render, commit.
    ///
    /// # Errors
    ///
    /// Propagates tree errors from the render pass.
    pub fn click(&mut self, target: ElementId) -> Result<(), HarnessError> {
        self.doc.focus(target);
        self.app.on_click(&mut self.doc, target);
        tracing::debug!(%target, "click");
        self.settle()
    }

    /// Press one key through the full pipeline.
    ///
    /// # Errors
    ///
    /// Propagates tree errors from the render pass.
    pub fn press(&mut self, key: KeyEvent) -> Result<KeyReport, HarnessError> {
        let outcome = self
            .app
            .trap()
            .map(|trap| trap.handle_key(&mut self.doc, &key));
        let consumed = outcome.is_some_and(|o| o.consumed);
        let native = !consumed && key.is_press() && self.native_action(&key);
        self.settle()?;

        let report = KeyReport {
            key,
            outcome,
            native,
            focused: self.doc.active_element(),
        };
        tracing::debug!(
            key = ?report.key.code,
            consumed,
            native,
            focused = ?report.focused,
            "key"
        );
        self.transcript.push(report);
        Ok(report)
    }

    pub fn tab(&mut self) -> Result<KeyReport, HarnessError> {
        self.press(KeyEvent::new(KeyCode::Tab))
    }

    pub fn shift_tab(&mut self) -> Result<KeyReport, HarnessError> {
        self.press(KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT))
    }

    pub fn escape(&mut self) -> Result<KeyReport, HarnessError> {
        self.press(KeyEvent::new(KeyCode::Escape))
    }

    /// Press every key in a script (see [`crate::keyboard`]).
    ///
    /// # Errors
    ///
    /// Fails before pressing anything if the script does not parse.
    pub fn keyboard(&mut self, script: &str) -> Result<Vec<KeyReport>, HarnessError> {
        let keys = parse_key_script(script)?;
        keys.into_iter().map(|key| self.press(key)).collect()
    }

    /// Deliver a platform event.
    ///
    /// `Focus(false)` models focus leaving the document (address bar,
    /// another window); the active element is cleared.
    ///
    /// # Errors
    ///
    /// Propagates tree errors from the render pass.
    pub fn dispatch(&mut self, event: Event) -> Result<Option<KeyReport>, HarnessError> {
        match event {
            Event::Key(key) => self.press(key).map(Some),
            Event::Focus(false) => {
                self.doc.blur();
                self.settle()?;
                Ok(None)
            }
            Event::Focus(true) => Ok(None),
        }
    }

    /// Every key pressed so far.
    #[must_use]
    pub fn transcript(&self) -> &[KeyReport] {
        &self.transcript
    }

    /// The transcript as JSON lines, one object per key.
    #[must_use]
    pub fn transcript_jsonl(&self) -> String {
        let mut out = String::new();
        for (step, report) in self.transcript.iter().enumerate() {
            let line = json!({
                "step": step,
                "key": format!("{:?}", report.key.code),
                "shift": report.key.shift(),
                "gesture": report.outcome.map(|o| format!("{:?}", o.gesture)),
                "consumed": report.outcome.is_some_and(|o| o.consumed),
                "exit_signaled": report.outcome.is_some_and(|o| o.exit_signaled),
                "native": report.native,
                "focused": report.focused.map(|id| id.to_string()),
            });
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }

    /// Unmount the app's trap and hand back the document.
    pub fn unmount(mut self) -> Document {
        if let Some(trap) = self.app.trap() {
            trap.unmount(&mut self.doc);
        }
        self.doc
    }

    fn native_action(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Tab => {
                self.doc.advance_focus(!key.shift());
                true
            }
            KeyCode::BackTab => {
                self.doc.advance_focus(false);
                true
            }
            _ => false,
        }
    }

    fn settle(&mut self) -> Result<(), HarnessError> {
        self.app.update(&mut self.doc)?;
        if let Some(trap) = self.app.trap() {
            trap.commit(&mut self.doc);
        }
        Ok(())
    }
}
