#![forbid(unsafe_code)]

//! Focusable-set resolution.
//!
//! An element inside the container is focusable when it matches the
//! focusable pattern and is not excluded:
//!
//! - **Pattern**: tag `button`, `textarea`, `input`, `select`, or `summary`;
//!   a `details` without its own `summary` child; any element with `href`;
//!   or any element whose `tabindex` is present and not literally `-1`.
//! - **Exclusion**: `disabled` present, or `aria-hidden` set to a non-empty
//!   value other than `false`.
//!
//! Order is document order. Positive `tabindex` values do not reorder the
//! set, so a container that uses them wraps in document order rather than
//! native sequential order.
//!
//! The set is a snapshot. The tree may change between gestures, so callers
//! resolve again on every gesture rather than caching.

use std::slice;

use ftrap_core::{ElementId, FocusSurface, Tag};

use super::diagnostic::{HandleRole, TrapDiagnostic};

/// Tags that match the focusable pattern on their own.
#[must_use]
pub const fn is_focusable_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Button | Tag::TextArea | Tag::Input | Tag::Select | Tag::Summary
    )
}

/// A `details` is its own disclosure control only when no `summary` child
/// takes that role.
fn is_bare_details(surface: &dyn FocusSurface, id: ElementId) -> bool {
    surface.tag(id) == Some(&Tag::Details)
        && !surface.descendants(id).into_iter().any(|child| {
            surface.parent(child) == Some(id) && surface.tag(child) == Some(&Tag::Summary)
        })
}

/// Ordered snapshot of the focusable descendants of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusableSet {
    elements: Vec<ElementId>,
}

impl FocusableSet {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<ElementId> {
        self.elements.first().copied()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<ElementId> {
        self.elements.last().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains(&id)
    }

    /// Index of `id` in document order.
    #[must_use]
    pub fn position(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| *e == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ElementId] {
        &self.elements
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ElementId> {
        self.elements
    }
}

impl FromIterator<ElementId> for FocusableSet {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FocusableSet {
    type Item = &'a ElementId;
    type IntoIter = slice::Iter<'a, ElementId>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Computes [`FocusableSet`]s on demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusableSetResolver;

impl FocusableSetResolver {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve the focusable descendants of `container`.
    ///
    /// # Errors
    ///
    /// [`TrapDiagnostic::ContainerUnavailable`] when `container` is absent
    /// or not a live element.
    pub fn try_resolve(
        &self,
        surface: &dyn FocusSurface,
        container: Option<ElementId>,
    ) -> Result<FocusableSet, TrapDiagnostic> {
        let Some(container) = container else {
            return Err(TrapDiagnostic::ContainerUnavailable { container: None });
        };
        if !surface.is_element(container) {
            return Err(TrapDiagnostic::ContainerUnavailable {
                container: Some(container),
            });
        }
        Ok(surface
            .descendants(container)
            .into_iter()
            .filter(|id| Self::is_focusable(surface, *id))
            .collect())
    }

    /// Like [`try_resolve`](Self::try_resolve), but degrades to an empty set
    /// and logs instead of failing.
    #[must_use]
    pub fn resolve(&self, surface: &dyn FocusSurface, container: Option<ElementId>) -> FocusableSet {
        self.try_resolve(surface, container).unwrap_or_else(|diag| {
            diag.emit();
            FocusableSet::empty()
        })
    }

    /// Pattern match without exclusions.
    #[must_use]
    pub fn matches_pattern(surface: &dyn FocusSurface, id: ElementId) -> bool {
        let Some(tag) = surface.tag(id) else {
            return false;
        };
        is_focusable_tag(tag)
            || is_bare_details(surface, id)
            || surface.has_attribute(id, "href")
            || surface
                .attribute(id, "tabindex")
                .is_some_and(|v| v.trim() != "-1")
    }

    /// Hidden from assistive technology or disabled.
    #[must_use]
    pub fn is_excluded(surface: &dyn FocusSurface, id: ElementId) -> bool {
        if surface.has_attribute(id, "disabled") {
            return true;
        }
        surface
            .attribute(id, "aria-hidden")
            .is_some_and(|v| !v.is_empty() && !v.eq_ignore_ascii_case("false"))
    }

    #[must_use]
    pub fn is_focusable(surface: &dyn FocusSurface, id: ElementId) -> bool {
        surface.is_element(id)
            && Self::matches_pattern(surface, id)
            && !Self::is_excluded(surface, id)
    }
}

/// Validate a handle the surface reported as focused.
pub(crate) fn checked_active(
    surface: &dyn FocusSurface,
) -> Result<Option<ElementId>, TrapDiagnostic> {
    match surface.active_element() {
        Some(id) if !surface.is_element(id) => Err(TrapDiagnostic::InvalidHandle {
            element: id,
            role: HandleRole::ActiveElement,
        }),
        other => Ok(other),
    }
}
