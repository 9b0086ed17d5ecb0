#![forbid(unsafe_code)]

//! Reference apps.
//!
//! - [`DialogApp`]: a toggle button and an always-present dialog panel whose
//!   content is only rendered while open. `on_enter` focuses the panel.
//! - [`ConditionalTrapApp`]: the trap container itself is rendered only
//!   while open, so the container ref binds late. `on_enter` focuses the
//!   first focusable element.
//!
//! Both close on Escape and restore focus to the toggle.

use ftrap_core::{Document, ElementId, FocusSurface, Tag, TreeError};
use ftrap_widgets::{FocusTrapHost, TrapConfig};

use crate::session::App;

/// Builds dialog content under the panel; returns the top-level nodes.
pub type ContentBuilder = fn(&mut Document, ElementId) -> Result<Vec<ElementId>, TreeError>;

/// Button, text input, label, link.
pub fn standard_content(
    doc: &mut Document,
    panel: ElementId,
) -> Result<Vec<ElementId>, TreeError> {
    let button = doc.append_element(panel, Tag::Button, &[])?;
    doc.append_text(button, "button")?;
    let input = doc.append_element(
        panel,
        Tag::Input,
        &[
            ("type", "text"),
            ("name", "input"),
            ("id", "input"),
            ("placeholder", "input"),
        ],
    )?;
    let label = doc.append_element(panel, Tag::Label, &[("for", "input")])?;
    doc.append_text(label, "input")?;
    let link = doc.append_element(panel, Tag::A, &[("href", "/home")])?;
    doc.append_text(link, "link")?;
    Ok(vec![button, input, label, link])
}

/// Prose only.
pub fn empty_content(doc: &mut Document, panel: ElementId) -> Result<Vec<ElementId>, TreeError> {
    let p = doc.append_element(panel, Tag::P, &[])?;
    doc.append_text(p, "nothing to focus")?;
    Ok(vec![p])
}

/// Toggle button plus a dialog panel with conditional content.
#[derive(Debug)]
pub struct DialogApp {
    host: FocusTrapHost,
    content: ContentBuilder,
    trigger: Option<ElementId>,
    panel: Option<ElementId>,
    rendered: Vec<ElementId>,
}

impl Default for DialogApp {
    fn default() -> Self {
        Self::new(standard_content)
    }
}

impl DialogApp {
    #[must_use]
    pub fn new(content: ContentBuilder) -> Self {
        Self::with_config(content, TrapConfig::default())
    }

    #[must_use]
    pub fn with_config(content: ContentBuilder, config: TrapConfig) -> Self {
        let mut host = FocusTrapHost::new(config).close_on_exit();
        let panel = host.container_ref();
        host.set_on_enter(move |surface: &mut dyn FocusSurface, _| {
            if let Some(panel) = panel.current() {
                surface.focus(panel);
            }
        });
        Self {
            host,
            content,
            trigger: None,
            panel: None,
            rendered: Vec::new(),
        }
    }

    #[must_use]
    pub fn trigger(&self) -> Option<ElementId> {
        self.trigger
    }

    #[must_use]
    pub fn panel(&self) -> Option<ElementId> {
        self.panel
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.host.should_trap().get()
    }

    /// Top-level content nodes currently rendered.
    #[must_use]
    pub fn content(&self) -> &[ElementId] {
        &self.rendered
    }

    #[must_use]
    pub fn host(&self) -> &FocusTrapHost {
        &self.host
    }
}

impl App for DialogApp {
    fn mount(&mut self, doc: &mut Document) -> Result<(), TreeError> {
        let body = doc.body();
        let root = doc.append_element(body, Tag::Div, &[])?;
        let trigger = doc.append_element(root, Tag::Button, &[])?;
        doc.append_text(trigger, "toggle")?;
        let panel = doc.append_element(root, Tag::Div, &[("role", "dialog"), ("tabindex", "-1")])?;
        self.trigger = Some(trigger);
        self.panel = Some(panel);
        self.host.attach_container(panel);
        Ok(())
    }

    fn update(&mut self, doc: &mut Document) -> Result<(), TreeError> {
        let Some(panel) = self.panel else {
            return Ok(());
        };
        let open = self.is_open();
        if open && self.rendered.is_empty() {
            self.rendered = (self.content)(doc, panel)?;
        } else if !open && !self.rendered.is_empty() {
            for node in self.rendered.drain(..) {
                doc.remove(node)?;
            }
        }
        Ok(())
    }

    fn on_click(&mut self, _doc: &mut Document, target: ElementId) {
        if Some(target) == self.trigger {
            self.host.set_should_trap(true);
        }
    }

    fn trap(&mut self) -> Option<&mut FocusTrapHost> {
        Some(&mut self.host)
    }
}

/// Toggle button plus a trap container rendered only while open.
#[derive(Debug)]
pub struct ConditionalTrapApp {
    host: FocusTrapHost,
    trigger: Option<ElementId>,
    container: Option<ElementId>,
    items: Vec<ElementId>,
}

impl Default for ConditionalTrapApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionalTrapApp {
    #[must_use]
    pub fn new() -> Self {
        let mut host = FocusTrapHost::default().close_on_exit();
        host.set_on_enter(|surface: &mut dyn FocusSurface, set| {
            if let Some(first) = set.first() {
                surface.focus(first);
            }
        });
        Self {
            host,
            trigger: None,
            container: None,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn trigger(&self) -> Option<ElementId> {
        self.trigger
    }

    #[must_use]
    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    /// The two buttons inside the container while it is rendered.
    #[must_use]
    pub fn items(&self) -> &[ElementId] {
        &self.items
    }

    #[must_use]
    pub fn host(&self) -> &FocusTrapHost {
        &self.host
    }
}

impl App for ConditionalTrapApp {
    fn mount(&mut self, doc: &mut Document) -> Result<(), TreeError> {
        let body = doc.body();
        let root = doc.append_element(body, Tag::Div, &[])?;
        let trigger = doc.append_element(root, Tag::Button, &[])?;
        doc.append_text(trigger, "toggle")?;
        self.trigger = Some(trigger);
        Ok(())
    }

    fn update(&mut self, doc: &mut Document) -> Result<(), TreeError> {
        let Some(trigger) = self.trigger else {
            return Ok(());
        };
        let open = self.host.should_trap().get();
        match (open, self.container) {
            (true, None) => {
                let root = doc.parent(trigger).unwrap_or_else(|| doc.body());
                let container = doc.append_element(root, Tag::Div, &[])?;
                let one = doc.append_element(container, Tag::Button, &[])?;
                doc.append_text(one, "1")?;
                let two = doc.append_element(container, Tag::Button, &[])?;
                doc.append_text(two, "2")?;
                self.container = Some(container);
                self.items = vec![one, two];
                self.host.attach_container(container);
            }
            (false, Some(container)) => {
                self.host.detach_container();
                self.items.clear();
                self.container = None;
                doc.remove(container)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_click(&mut self, _doc: &mut Document, target: ElementId) {
        if Some(target) == self.trigger {
            self.host.should_trap().update(|open| *open = !*open);
        }
    }

    fn trap(&mut self) -> Option<&mut FocusTrapHost> {
        Some(&mut self.host)
    }
}
