#![forbid(unsafe_code)]

//! In-memory element tree with browser-like focus.
//!
//! [`Document`] is the reference [`FocusSurface`](crate::FocusSurface): an
//! arena of element and text nodes rooted at a `body` element, with exactly
//! one (or no) active element.
//!
//! # Invariants
//!
//! 1. Handles are `(slot, generation)` pairs. Freeing a node bumps its slot's
//!    generation, so a stale handle never aliases a newer node.
//! 2. A node has at most one parent; `append_child` re-parents.
//! 3. The tree is acyclic: a node can never be appended under itself or one
//!    of its descendants.
//! 4. The active element, when present, is live, connected, and focusable.
//!    Removing or detaching it (or an ancestor) clears focus, as browsers
//!    move focus back to the body.
//!
//! # Sequential navigation
//!
//! [`Document::next_tabbable`] mimics browser Tab handling: elements with a
//! positive `tabindex` come first in ascending order, then everything with an
//! effective index of zero in document order. Past either end focus leaves the
//! document (`None`); from `None` it re-enters at the first or last tabbable.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Stale handle | Node freed by `remove` | Queries return `None`/`false`; mutations return [`TreeError::StaleHandle`] |
//! | Text node as parent | Appending under a text node | [`TreeError::NotAnElement`] |
//! | Cycle | Appending an ancestor under its descendant | [`TreeError::CycleDetected`] |

use std::fmt;

use rustc_hash::FxHashMap;

/// Generation-checked handle to a node in a [`Document`].
///
/// Handles are `Copy` and carry no ownership. A handle may point at a text
/// node; element-only operations treat that as invalid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    slot: u32,
    generation: u32,
}

impl ElementId {
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}

/// Element kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    A,
    Area,
    Body,
    Button,
    Details,
    Dialog,
    Div,
    Img,
    Input,
    Label,
    P,
    Section,
    Select,
    Span,
    Summary,
    TextArea,
    /// Any other tag, stored lowercase.
    Other(String),
}

impl Tag {
    /// Parse a tag name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "area" => Self::Area,
            "body" => Self::Body,
            "button" => Self::Button,
            "details" => Self::Details,
            "dialog" => Self::Dialog,
            "div" => Self::Div,
            "img" => Self::Img,
            "input" => Self::Input,
            "label" => Self::Label,
            "p" => Self::P,
            "section" => Self::Section,
            "select" => Self::Select,
            "span" => Self::Span,
            "summary" => Self::Summary,
            "textarea" => Self::TextArea,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::A => "a",
            Self::Area => "area",
            Self::Body => "body",
            Self::Button => "button",
            Self::Details => "details",
            Self::Dialog => "dialog",
            Self::Div => "div",
            Self::Img => "img",
            Self::Input => "input",
            Self::Label => "label",
            Self::P => "p",
            Self::Section => "section",
            Self::Select => "select",
            Self::Span => "span",
            Self::Summary => "summary",
            Self::TextArea => "textarea",
            Self::Other(name) => name,
        }
    }

    /// Form controls honour the `disabled` attribute.
    #[must_use]
    pub const fn is_form_control(&self) -> bool {
        matches!(
            self,
            Self::Button | Self::Input | Self::Select | Self::TextArea
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from tree mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The handle refers to a freed node.
    StaleHandle(ElementId),
    /// The operation needs an element but got a text node.
    NotAnElement(ElementId),
    /// The append would make a node its own ancestor.
    CycleDetected { parent: ElementId, child: ElementId },
    /// `reference` is not a child of `parent`.
    NotAChild { parent: ElementId, reference: ElementId },
    /// The document root cannot be moved or removed.
    RootImmutable,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleHandle(id) => write!(f, "stale node handle {id}"),
            Self::NotAnElement(id) => write!(f, "node {id} is not an element"),
            Self::CycleDetected { parent, child } => {
                write!(f, "appending {child} under {parent} would create a cycle")
            }
            Self::NotAChild { parent, reference } => {
                write!(f, "{reference} is not a child of {parent}")
            }
            Self::RootImmutable => f.write_str("the document root cannot be moved or removed"),
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: Tag,
        attributes: FxHashMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<u32>,
    children: Vec<u32>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed element tree with a single focus owner.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: ElementId,
    active: Option<ElementId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only its `body`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: ElementId {
                slot: 0,
                generation: 0,
            },
            active: None,
        };
        doc.root = doc.create_element(Tag::Body);
        doc
    }

    /// The root `body` element.
    #[inline]
    #[must_use]
    pub fn body(&self) -> ElementId {
        self.root
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: Tag) -> ElementId {
        self.alloc(NodeKind::Element {
            tag,
            attributes: FxHashMap::default(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> ElementId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: ElementId,
        tag: Tag,
        attributes: &[(&str, &str)],
    ) -> Result<ElementId, TreeError> {
        let id = self.create_element(tag);
        for (name, value) in attributes {
            self.set_attribute(id, name, value)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(
        &mut self,
        parent: ElementId,
        text: impl Into<String>,
    ) -> Result<ElementId, TreeError> {
        let id = self.create_text(text);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, re-parenting if needed.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        self.unlink(child.slot);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child.slot);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent.slot);
        }
        self.revalidate_focus(parent);
        Ok(())
    }

    /// Insert `child` before `reference`, which must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: ElementId,
    ) -> Result<(), TreeError> {
        self.check_insert(parent, child)?;
        if self.parent(reference) != Some(parent) || reference == child {
            return Err(TreeError::NotAChild { parent, reference });
        }
        self.unlink(child.slot);
        let Some(p) = self.node_mut(parent) else {
            return Err(TreeError::StaleHandle(parent));
        };
        let at = p
            .children
            .iter()
            .position(|slot| *slot == reference.slot)
            .unwrap_or(p.children.len());
        p.children.insert(at, child.slot);
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent.slot);
        }
        self.revalidate_focus(parent);
        Ok(())
    }

    /// Detach `id` from its parent without freeing it.
    ///
    /// The node and its subtree stay alive but disconnected, like a DOM node
    /// removed while script still references it. Focus inside the subtree is
    /// cleared.
    pub fn detach(&mut self, id: ElementId) -> Result<(), TreeError> {
        self.check_mutable(id)?;
        self.clear_focus_within(id);
        self.unlink(id.slot);
        Ok(())
    }

    /// Detach `id` and free it together with its subtree.
    ///
    /// Every handle into the subtree becomes stale.
    pub fn remove(&mut self, id: ElementId) -> Result<(), TreeError> {
        self.check_mutable(id)?;
        self.clear_focus_within(id);
        self.unlink(id.slot);
        let mut stack = vec![id.slot];
        while let Some(slot) = stack.pop() {
            let entry = &mut self.slots[slot as usize];
            if let Some(node) = entry.node.take() {
                stack.extend(node.children);
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(slot);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(node = %id, "tree remove");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: &str,
    ) -> Result<(), TreeError> {
        let attributes = self.attributes_mut(id)?;
        attributes.insert(name.to_ascii_lowercase(), value.to_owned());
        self.revalidate_focus(id);
        Ok(())
    }

    pub fn remove_attribute(
        &mut self,
        id: ElementId,
        name: &str,
    ) -> Result<Option<String>, TreeError> {
        let attributes = self.attributes_mut(id)?;
        let old = attributes.remove(&name.to_ascii_lowercase());
        self.revalidate_focus(id);
        Ok(old)
    }

    #[must_use]
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.get(&name.to_ascii_lowercase()).map(String::as_str)
            }
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    // ------------------------------------------------------------------
    // Structure queries
    // ------------------------------------------------------------------

    /// Whether the handle refers to a live node (element or text).
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.node(id).is_some()
    }

    /// Whether the handle refers to a live element node.
    #[must_use]
    pub fn is_element(&self, id: ElementId) -> bool {
        matches!(
            self.node(id).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        )
    }

    /// Whether the node is live and reachable from `body`.
    #[must_use]
    pub fn is_connected(&self, id: ElementId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut slot = id.slot;
        loop {
            if slot == self.root.slot {
                return true;
            }
            match self.slots[slot as usize].node.as_ref().and_then(|n| n.parent) {
                Some(parent) => slot = parent,
                None => return false,
            }
        }
    }

    #[must_use]
    pub fn tag(&self, id: ElementId) -> Option<&Tag> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.node(id)?.parent?;
        Some(self.handle(parent))
    }

    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.node(id)
            .map(|n| n.children.iter().map(|slot| self.handle(*slot)).collect())
            .unwrap_or_default()
    }

    /// Inclusive containment, like DOM `Node.contains`.
    #[must_use]
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return false;
        }
        let mut slot = node.slot;
        loop {
            if slot == ancestor.slot {
                return true;
            }
            match self.slots[slot as usize].node.as_ref().and_then(|n| n.parent) {
                Some(parent) => slot = parent,
                None => return false,
            }
        }
    }

    /// All nodes below `root` in document (pre-order) order, `root` excluded.
    #[must_use]
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let Some(node) = self.node(root) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack: Vec<u32> = node.children.iter().rev().copied().collect();
        while let Some(slot) = stack.pop() {
            out.push(self.handle(slot));
            if let Some(n) = self.slots[slot as usize].node.as_ref() {
                stack.extend(n.children.iter().rev());
            }
        }
        out
    }

    /// Number of live nodes, `body` included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    // ------------------------------------------------------------------
    // Focusability
    // ------------------------------------------------------------------

    /// Parsed `tabindex`, if present and numeric.
    #[must_use]
    pub fn tab_index(&self, id: ElementId) -> Option<i32> {
        self.attribute(id, "tabindex")?.trim().parse().ok()
    }

    /// Whether a form control carries `disabled`.
    #[must_use]
    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.tag(id).is_some_and(Tag::is_form_control) && self.has_attribute(id, "disabled")
    }

    /// Focusable without a `tabindex` attribute.
    fn is_natively_focusable(&self, id: ElementId) -> bool {
        match self.tag(id) {
            Some(Tag::A | Tag::Area) => self.has_attribute(id, "href"),
            Some(Tag::Summary) => true,
            Some(Tag::Details) => !self.has_summary_child(id),
            Some(tag) if tag.is_form_control() => {
                !self.has_attribute(id, "disabled")
                    && !(matches!(tag, Tag::Input)
                        && self.attribute(id, "type") == Some("hidden"))
            }
            _ => false,
        }
    }

    /// A `details` with its own `summary` child delegates focus to it.
    #[must_use]
    pub fn has_summary_child(&self, id: ElementId) -> bool {
        self.children(id)
            .into_iter()
            .any(|child| self.tag(child) == Some(&Tag::Summary))
    }

    /// Drop focus from `id` if it can no longer hold it.
    fn revalidate_focus(&mut self, id: ElementId) {
        if self.active == Some(id) && !self.is_focusable(id) {
            self.active = None;
        }
    }

    /// Whether `focus(id)` would succeed.
    #[must_use]
    pub fn is_focusable(&self, id: ElementId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) || self.is_disabled(id) {
            return false;
        }
        self.tab_index(id).is_some() || self.is_natively_focusable(id)
    }

    /// Tab index used for sequential navigation, `None` if unfocusable.
    #[must_use]
    pub fn effective_tab_index(&self, id: ElementId) -> Option<i32> {
        if !self.is_focusable(id) {
            return None;
        }
        Some(self.tab_index(id).unwrap_or(0))
    }

    /// Reachable with the Tab key.
    #[must_use]
    pub fn is_tabbable(&self, id: ElementId) -> bool {
        self.effective_tab_index(id).is_some_and(|idx| idx >= 0)
    }

    /// Every tabbable element in browser sequential-navigation order.
    #[must_use]
    pub fn sequential_order(&self) -> Vec<ElementId> {
        let mut positive: Vec<(i32, ElementId)> = Vec::new();
        let mut zero = Vec::new();
        for id in self.descendants(self.root) {
            match self.effective_tab_index(id) {
                Some(idx) if idx > 0 => positive.push((idx, id)),
                Some(0) => zero.push(id),
                _ => {}
            }
        }
        // Stable: ties keep document order.
        positive.sort_by_key(|(idx, _)| *idx);
        positive.into_iter().map(|(_, id)| id).chain(zero).collect()
    }

    /// Where native Tab (or Shift+Tab) navigation goes from `from`.
    ///
    /// `None` as a result means focus leaves the document.
    #[must_use]
    pub fn next_tabbable(&self, from: Option<ElementId>, forward: bool) -> Option<ElementId> {
        let order = self.sequential_order();
        let from = from.filter(|id| self.is_connected(*id));
        let Some(from) = from else {
            return if forward {
                order.first().copied()
            } else {
                order.last().copied()
            };
        };

        if let Some(pos) = order.iter().position(|id| *id == from) {
            return if forward {
                order.get(pos + 1).copied()
            } else {
                pos.checked_sub(1).and_then(|p| order.get(p).copied())
            };
        }

        // Focus sits on something outside the sequence (tabindex=-1, a plain
        // container): continue from its document position among tabindex=0
        // elements.
        let doc_order = self.descendants(self.root);
        let doc_pos = |id: ElementId| doc_order.iter().position(|d| *d == id);
        let here = doc_pos(from)?;
        let zero_group = order
            .iter()
            .copied()
            .filter(|id| self.effective_tab_index(*id) == Some(0));
        if forward {
            zero_group
                .into_iter()
                .find(|id| doc_pos(*id).is_some_and(|p| p > here))
        } else {
            zero_group
                .into_iter()
                .filter(|id| doc_pos(*id).is_some_and(|p| p < here))
                .last()
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn active_element(&self) -> Option<ElementId> {
        self.active
    }

    /// Move focus to `id` if it is focusable. Returns whether it took.
    pub fn focus(&mut self, id: ElementId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Drop focus; it leaves the document.
    pub fn blur(&mut self) -> Option<ElementId> {
        self.active.take()
    }

    /// Perform the browser's default Tab action. Returns the new focus.
    pub fn advance_focus(&mut self, forward: bool) -> Option<ElementId> {
        self.active = self.next_tabbable(self.active, forward);
        self.active
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn alloc(&mut self, kind: NodeKind) -> ElementId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.node = Some(node);
            return ElementId {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        ElementId {
            slot,
            generation: 0,
        }
    }

    fn handle(&self, slot: u32) -> ElementId {
        ElementId {
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        let entry = self.slots.get(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.node.as_ref()
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        let entry = self.slots.get_mut(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        entry.node.as_mut()
    }

    fn attributes_mut(
        &mut self,
        id: ElementId,
    ) -> Result<&mut FxHashMap<String, String>, TreeError> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element { attributes, .. }) => Ok(attributes),
            Some(NodeKind::Text(_)) => Err(TreeError::NotAnElement(id)),
            None => Err(TreeError::StaleHandle(id)),
        }
    }

    fn check_mutable(&self, id: ElementId) -> Result<(), TreeError> {
        if !self.is_alive(id) {
            return Err(TreeError::StaleHandle(id));
        }
        if id == self.root {
            return Err(TreeError::RootImmutable);
        }
        Ok(())
    }

    fn check_insert(&self, parent: ElementId, child: ElementId) -> Result<(), TreeError> {
        if !self.is_alive(parent) {
            return Err(TreeError::StaleHandle(parent));
        }
        if !self.is_element(parent) {
            return Err(TreeError::NotAnElement(parent));
        }
        self.check_mutable(child)?;
        if self.contains(child, parent) {
            return Err(TreeError::CycleDetected { parent, child });
        }
        Ok(())
    }

    fn unlink(&mut self, slot: u32) {
        let Some(parent) = self.slots[slot as usize].node.as_mut().and_then(|n| n.parent.take())
        else {
            return;
        };
        if let Some(p) = self.slots[parent as usize].node.as_mut() {
            p.children.retain(|c| *c != slot);
        }
    }

    fn clear_focus_within(&mut self, id: ElementId) {
        if self.active.is_some_and(|active| self.contains(id, active)) {
            self.active = None;
        }
    }
}
