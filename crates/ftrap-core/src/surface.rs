#![forbid(unsafe_code)]

//! The focus surface seam.
//!
//! A [`FocusSurface`] is the part of a UI tree a focus controller may see:
//! structure, attributes, and the single global focus owner. Engines borrow a
//! surface per call and never keep it; everything they remember between calls
//! is an [`ElementId`] that must be re-validated through these methods.
//!
//! Implementations must re-read focus on every call. The environment (native
//! Tab handling, mouse clicks, script) can move focus between any two engine
//! calls.

use crate::tree::{Document, ElementId, Tag};

/// Read/focus access to a UI tree.
pub trait FocusSurface {
    /// Live element node (not a text node, not stale).
    fn is_element(&self, id: ElementId) -> bool;

    /// Live and attached to the document.
    fn is_connected(&self, id: ElementId) -> bool;

    /// Inclusive containment.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool;

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: ElementId) -> Vec<ElementId>;

    fn parent(&self, id: ElementId) -> Option<ElementId>;

    fn tag(&self, id: ElementId) -> Option<&Tag>;

    fn attribute(&self, id: ElementId, name: &str) -> Option<&str>;

    fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// The element currently holding focus, if focus is in the document.
    fn active_element(&self) -> Option<ElementId>;

    /// Try to move focus. Returns whether focus landed on `id`.
    fn focus(&mut self, id: ElementId) -> bool;
}

impl FocusSurface for Document {
    fn is_element(&self, id: ElementId) -> bool {
        Document::is_element(self, id)
    }

    fn is_connected(&self, id: ElementId) -> bool {
        Document::is_connected(self, id)
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        Document::contains(self, ancestor, node)
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        Document::descendants(self, root)
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        Document::parent(self, id)
    }

    fn tag(&self, id: ElementId) -> Option<&Tag> {
        Document::tag(self, id)
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        Document::attribute(self, id, name)
    }

    fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        Document::has_attribute(self, id, name)
    }

    fn active_element(&self) -> Option<ElementId> {
        Document::active_element(self)
    }

    fn focus(&mut self, id: ElementId) -> bool {
        Document::focus(self, id)
    }
}
