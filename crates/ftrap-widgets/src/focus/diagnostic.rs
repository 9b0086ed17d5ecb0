#![forbid(unsafe_code)]

//! Non-fatal trap diagnostics.
//!
//! Nothing in the trap is allowed to fail the host. Conditions that would be
//! errors elsewhere are recorded as [`TrapDiagnostic`]s on the engine and
//! logged; the operation that hit them degrades to a no-op.
//!
//! | Diagnostic | Cause | Behavior |
//! |------------|-------|----------|
//! | `ContainerUnavailable` | Container absent, stale, or a text node | Gesture passes through; logged once per session |
//! | `EmptyFocusableSet` | No focusable descendants | Advance suppressed, no focus move |
//! | `StaleCapturedFocus` | Captured element removed or detached | Restore skipped |
//! | `InvalidHandle` | Surface handed back something that is not an element | Ignored |
//! | `FocusRejected` | Surface refused to focus a resolved element | Focus stays put |

use std::fmt;

use ftrap_core::ElementId;

/// What a handle was supposed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRole {
    ActiveElement,
    CapturedFocus,
}

impl fmt::Display for HandleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ActiveElement => "active element",
            Self::CapturedFocus => "captured focus",
        })
    }
}

/// A degraded-but-handled condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapDiagnostic {
    /// No usable container. `Some` carries a handle that exists but is not a
    /// live element.
    ContainerUnavailable { container: Option<ElementId> },
    /// The container has no focusable descendants.
    EmptyFocusableSet { container: ElementId },
    /// The element to restore focus to is gone or detached.
    StaleCapturedFocus { element: ElementId },
    /// A handle that should name an element does not.
    InvalidHandle { element: ElementId, role: HandleRole },
    /// The surface declined to focus a resolved element.
    FocusRejected { element: ElementId },
}

impl TrapDiagnostic {
    /// Structurally invalid input, as opposed to an expected transient state.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ContainerUnavailable {
                container: Some(_)
            } | Self::InvalidHandle { .. }
        )
    }

    /// Log at a level matching severity.
    pub(crate) fn emit(&self) {
        if self.is_structural() {
            tracing::warn!(diagnostic = %self, "focus trap received an invalid handle");
        } else {
            tracing::debug!(diagnostic = %self, "focus trap degraded");
        }
    }
}

impl fmt::Display for TrapDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainerUnavailable { container: None } => {
                f.write_str("container is not attached")
            }
            Self::ContainerUnavailable {
                container: Some(id),
            } => write!(f, "container {id} is not a live element"),
            Self::EmptyFocusableSet { container } => {
                write!(f, "container {container} has no focusable descendants")
            }
            Self::StaleCapturedFocus { element } => {
                write!(f, "captured focus {element} is no longer attached")
            }
            Self::InvalidHandle { element, role } => {
                write!(f, "{role} {element} is not an element")
            }
            Self::FocusRejected { element } => write!(f, "{element} refused focus"),
        }
    }
}

impl std::error::Error for TrapDiagnostic {}
