#![forbid(unsafe_code)]

//! Focus-trap engine.
//!
//! # Lifecycle
//!
//! ```text
//!            set_activation(true)           (pre-paint)
//! Inactive ─────────────────────► Capturing ───────────► Active
//!    ▲        capture focus                 on_enter,      │
//!    │                                      start listener │
//!    └─────────────────────────────────────────────────────┘
//!        set_activation(false) / teardown: stop listener, restore focus
//! ```
//!
//! Activation is a two-phase commit. [`FocusTrapEngine::will_activate`]
//! records the element that held focus before the host had any chance to move
//! it, and [`FocusTrapEngine::activated`] runs `on_enter` and registers the
//! gesture listener. [`FocusTrapEngine::set_activation`] runs both phases
//! back to back for hosts without a paint step.
//!
//! # Gesture policy
//!
//! While active, only boundary moves are intercepted; native Tab handling
//! does the rest.
//!
//! | Focus | Gesture | Action |
//! |-------|---------|--------|
//! | last element | forward | consume, focus first |
//! | first element or container | backward | consume, focus last |
//! | outside container | forward/backward | consume, focus first |
//! | any, empty set | forward/backward | consume, no move |
//! | any | exit key | `on_exit` once per session, pass through |
//!
//! # Invariants
//!
//! 1. The listener is registered iff the engine is `Active` with a live
//!    container.
//! 2. `on_enter` runs at most once per Inactive→Active cycle.
//! 3. `on_exit` runs at most once per cycle; the engine never deactivates
//!    itself in response to it.
//! 4. Captured focus is released on deactivation whether or not it could be
//!    restored.

use std::collections::VecDeque;
use std::fmt;

use ftrap_core::{ElementId, FocusSurface, KeyCode, KeyEvent, Modifiers};

use super::config::TrapConfig;
use super::diagnostic::{HandleRole, TrapDiagnostic};
use super::listener::GestureListener;
use super::resolver::{FocusableSet, FocusableSetResolver, checked_active};

/// Runs once per activation with the live surface and the resolved set.
pub type EnterHook = Box<dyn FnMut(&mut dyn FocusSurface, &FocusableSet)>;

/// Runs when the exit key is pressed. Typically clears the host's
/// activation flag.
pub type ExitHook = Box<dyn FnMut()>;

/// Retained diagnostics before the oldest is dropped.
const MAX_DIAGNOSTICS: usize = 32;

/// Engine activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivationState {
    #[default]
    Inactive,
    /// Focus captured; waiting for the post-commit phase.
    Capturing,
    Active,
}

/// What a key event means to the trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    AdvanceForward,
    AdvanceBackward,
    EscapeExit,
    Ignored,
}

impl Gesture {
    /// Classify a key event under `config`.
    ///
    /// Tab with Ctrl, Alt, or Super is left to the platform. Releases are
    /// always ignored.
    #[must_use]
    pub fn classify(key: &KeyEvent, config: &TrapConfig) -> Self {
        if !key.is_press() {
            return Self::Ignored;
        }
        let chorded = key
            .modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER);
        match key.code {
            KeyCode::Tab if chorded => Self::Ignored,
            KeyCode::Tab if key.shift() => Self::AdvanceBackward,
            KeyCode::Tab => Self::AdvanceForward,
            KeyCode::BackTab if chorded => Self::Ignored,
            KeyCode::BackTab => Self::AdvanceBackward,
            code if config.exit_key == Some(code) => Self::EscapeExit,
            _ => Self::Ignored,
        }
    }

    #[must_use]
    pub const fn is_advance(self) -> bool {
        matches!(self, Self::AdvanceForward | Self::AdvanceBackward)
    }
}

/// Result of offering a key event to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureOutcome {
    pub gesture: Gesture,
    /// The host must suppress the platform's default action.
    pub consumed: bool,
    /// Where the engine moved focus, if it did.
    pub moved_to: Option<ElementId>,
    /// `on_exit` was invoked for this event.
    pub exit_signaled: bool,
}

impl GestureOutcome {
    const fn pass(gesture: Gesture) -> Self {
        Self {
            gesture,
            consumed: false,
            moved_to: None,
            exit_signaled: false,
        }
    }

    const fn consumed(gesture: Gesture, moved_to: Option<ElementId>) -> Self {
        Self {
            gesture,
            consumed: true,
            moved_to,
            exit_signaled: false,
        }
    }
}

/// Notable engine transitions, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapEvent {
    /// `on_enter` ran and the listener started.
    Entered { focusable: usize },
    /// Boundary advance wrapped to the other end.
    Wrapped { from: ElementId, to: ElementId },
    /// Focus was outside the container and was pulled to the first element.
    Redirected { to: ElementId },
    /// Advance suppressed with focus left in place.
    Held,
    ExitRequested,
    /// Deactivated. `restored` is where focus went back to.
    Left { restored: Option<ElementId> },
}

/// Keeps keyboard focus inside a container while active.
///
/// The engine stores only handles. Every call borrows the surface, and every
/// remembered handle is re-validated before use.
pub struct FocusTrapEngine {
    config: TrapConfig,
    resolver: FocusableSetResolver,
    state: ActivationState,
    container: Option<ElementId>,
    captured: Option<ElementId>,
    listener: GestureListener,
    enter_pending: bool,
    exit_signaled: bool,
    unavailable_reported: bool,
    on_enter: Option<EnterHook>,
    on_exit: Option<ExitHook>,
    last_event: Option<TrapEvent>,
    diagnostics: VecDeque<TrapDiagnostic>,
}

impl fmt::Debug for FocusTrapEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrapEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("container", &self.container)
            .field("captured", &self.captured)
            .field("listening", &self.listener.is_listening())
            .field("enter_pending", &self.enter_pending)
            .field("exit_signaled", &self.exit_signaled)
            .field("last_event", &self.last_event)
            .finish_non_exhaustive()
    }
}

impl Default for FocusTrapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTrapEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TrapConfig::default())
    }

    #[must_use]
    pub fn with_config(config: TrapConfig) -> Self {
        Self {
            config,
            resolver: FocusableSetResolver::new(),
            state: ActivationState::Inactive,
            container: None,
            captured: None,
            listener: GestureListener::new(),
            enter_pending: false,
            exit_signaled: false,
            unavailable_reported: false,
            on_enter: None,
            on_exit: None,
            last_event: None,
            diagnostics: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn on_enter(
        mut self,
        hook: impl FnMut(&mut dyn FocusSurface, &FocusableSet) + 'static,
    ) -> Self {
        self.set_on_enter(hook);
        self
    }

    #[must_use]
    pub fn on_exit(mut self, hook: impl FnMut() + 'static) -> Self {
        self.set_on_exit(hook);
        self
    }

    pub fn set_on_enter(&mut self, hook: impl FnMut(&mut dyn FocusSurface, &FocusableSet) + 'static) {
        self.on_enter = Some(Box::new(hook));
    }

    pub fn set_on_exit(&mut self, hook: impl FnMut() + 'static) {
        self.on_exit = Some(Box::new(hook));
    }

    // --- Accessors ---

    #[must_use]
    pub fn config(&self) -> &TrapConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ActivationState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }

    #[inline]
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listener.is_listening()
    }

    #[must_use]
    pub fn listener(&self) -> &GestureListener {
        &self.listener
    }

    #[must_use]
    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    /// Element that held focus when the current session began.
    #[must_use]
    pub fn captured_focus(&self) -> Option<ElementId> {
        self.captured
    }

    /// Active but still waiting for a container to run `on_enter`.
    #[must_use]
    pub fn is_enter_pending(&self) -> bool {
        self.enter_pending
    }

    #[must_use]
    pub fn exit_signaled(&self) -> bool {
        self.exit_signaled
    }

    /// Resolve the current focusable set on demand.
    #[must_use]
    pub fn focusable_set(&self, surface: &dyn FocusSurface) -> FocusableSet {
        self.resolver
            .try_resolve(surface, self.container)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn trap_event(&self) -> Option<&TrapEvent> {
        self.last_event.as_ref()
    }

    pub fn take_trap_event(&mut self) -> Option<TrapEvent> {
        self.last_event.take()
    }

    /// Recorded diagnostics, oldest first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &TrapDiagnostic> {
        self.diagnostics.iter()
    }

    pub fn take_diagnostics(&mut self) -> Vec<TrapDiagnostic> {
        self.diagnostics.drain(..).collect()
    }

    // --- Container binding ---

    /// Bind or unbind the container.
    ///
    /// Binding a live container while active runs a deferred `on_enter` or
    /// restarts the listener. Unbinding while active stops the listener; the
    /// session and its captured focus survive.
    pub fn set_container(&mut self, surface: &mut dyn FocusSurface, container: Option<ElementId>) {
        if self.container == container {
            return;
        }
        tracing::debug!(?container, state = ?self.state, "focus trap container changed");
        self.container = container;
        if !self.is_active() {
            return;
        }
        if self.live_container(surface).is_some() {
            if self.enter_pending {
                self.enter(surface);
            } else {
                self.listener.start();
            }
        } else {
            self.listener.stop();
            self.report_unavailable();
        }
    }

    // --- Activation ---

    /// Drive the engine toward `active`. Returns whether the state changed.
    pub fn set_activation(&mut self, surface: &mut dyn FocusSurface, active: bool) -> bool {
        match (self.state, active) {
            (ActivationState::Inactive, true) => {
                self.will_activate(surface);
                self.activated(surface);
                true
            }
            (ActivationState::Capturing, true) => {
                self.activated(surface);
                true
            }
            (ActivationState::Capturing | ActivationState::Active, false) => {
                self.deactivate(surface);
                true
            }
            _ => false,
        }
    }

    /// Pre-paint phase: remember who holds focus.
    ///
    /// No-op unless inactive.
    pub fn will_activate(&mut self, surface: &dyn FocusSurface) {
        if self.state != ActivationState::Inactive {
            return;
        }
        self.captured = match checked_active(surface) {
            Ok(active) => active,
            Err(diag) => {
                self.record(diag);
                None
            }
        };
        self.state = ActivationState::Capturing;
        tracing::debug!(captured = ?self.captured, "focus trap capturing");
    }

    /// Post-commit phase: enter the trap, or defer until a container exists.
    ///
    /// No-op unless capturing.
    pub fn activated(&mut self, surface: &mut dyn FocusSurface) {
        if self.state != ActivationState::Capturing {
            return;
        }
        self.state = ActivationState::Active;
        self.exit_signaled = false;
        self.unavailable_reported = false;
        if self.live_container(surface).is_some() {
            self.enter(surface);
        } else {
            self.enter_pending = true;
            self.report_unavailable();
        }
    }

    /// Leave the session and give focus back to the captured element.
    pub fn deactivate(&mut self, surface: &mut dyn FocusSurface) {
        if self.state == ActivationState::Inactive {
            return;
        }
        let _span = tracing::debug_span!("focus_trap.deactivate").entered();
        self.listener.stop();
        self.enter_pending = false;
        self.exit_signaled = false;
        self.state = ActivationState::Inactive;

        let restored = self.captured.take().and_then(|id| self.restore(surface, id));
        tracing::debug!(?restored, "focus trap left");
        self.last_event = Some(TrapEvent::Left { restored });
    }

    /// Deactivate if needed and forget the container.
    pub fn teardown(&mut self, surface: &mut dyn FocusSurface) {
        self.deactivate(surface);
        self.container = None;
        self.listener.stop();
    }

    // --- Gestures ---

    /// Offer a key event to the trap.
    ///
    /// Does nothing unless the listener is registered.
    pub fn handle_gesture(&mut self, surface: &mut dyn FocusSurface, key: &KeyEvent) -> GestureOutcome {
        let gesture = Gesture::classify(key, &self.config);
        if gesture == Gesture::Ignored || !self.listener.is_listening() {
            return GestureOutcome::pass(gesture);
        }
        let _span = tracing::debug_span!("focus_trap.gesture", ?gesture).entered();
        let Some(container) = self.live_container(surface) else {
            self.report_unavailable();
            return GestureOutcome::pass(gesture);
        };

        match gesture {
            Gesture::EscapeExit => self.signal_exit(gesture),
            Gesture::AdvanceForward | Gesture::AdvanceBackward => {
                self.advance(surface, container, gesture)
            }
            Gesture::Ignored => GestureOutcome::pass(gesture),
        }
    }

    fn signal_exit(&mut self, gesture: Gesture) -> GestureOutcome {
        if self.exit_signaled {
            tracing::trace!("exit already signaled this session");
            return GestureOutcome::pass(gesture);
        }
        self.exit_signaled = true;
        self.last_event = Some(TrapEvent::ExitRequested);
        tracing::debug!("focus trap exit requested");
        if let Some(hook) = self.on_exit.as_mut() {
            hook();
        }
        GestureOutcome {
            exit_signaled: true,
            ..GestureOutcome::pass(gesture)
        }
    }

    fn advance(
        &mut self,
        surface: &mut dyn FocusSurface,
        container: ElementId,
        gesture: Gesture,
    ) -> GestureOutcome {
        let set = self.resolver.resolve(surface, Some(container));
        let (Some(first), Some(last)) = (set.first(), set.last()) else {
            self.record(TrapDiagnostic::EmptyFocusableSet { container });
            self.last_event = Some(TrapEvent::Held);
            return GestureOutcome::consumed(gesture, None);
        };

        let active = match checked_active(surface) {
            Ok(active) => active,
            Err(diag) => {
                self.record(diag);
                None
            }
        };
        let inside = active.is_some_and(|a| surface.contains(container, a));

        if !inside {
            if !self.config.redirect_outside {
                return GestureOutcome::pass(gesture);
            }
            let moved = self.move_focus(surface, first);
            if let Some(to) = moved {
                self.last_event = Some(TrapEvent::Redirected { to });
            }
            return GestureOutcome::consumed(gesture, moved);
        }

        let (at_boundary, target) = match gesture {
            Gesture::AdvanceForward => (active == Some(last), first),
            _ => (active == Some(first) || active == Some(container), last),
        };
        if !at_boundary {
            return GestureOutcome::pass(gesture);
        }
        if !self.config.wrap {
            self.last_event = Some(TrapEvent::Held);
            return GestureOutcome::consumed(gesture, None);
        }

        let moved = self.move_focus(surface, target);
        if let (Some(from), Some(to)) = (active, moved) {
            self.last_event = Some(TrapEvent::Wrapped { from, to });
        }
        GestureOutcome::consumed(gesture, moved)
    }

    // --- Internals ---

    fn enter(&mut self, surface: &mut dyn FocusSurface) {
        self.enter_pending = false;
        let set = self.resolver.resolve(surface, self.container);
        if let (true, Some(container)) = (set.is_empty(), self.container) {
            self.record(TrapDiagnostic::EmptyFocusableSet { container });
        }
        if let Some(hook) = self.on_enter.as_mut() {
            hook(&mut *surface, &set);
        }
        self.listener.start();
        tracing::debug!(focusable = set.len(), "focus trap entered");
        self.last_event = Some(TrapEvent::Entered {
            focusable: set.len(),
        });
    }

    fn restore(&mut self, surface: &mut dyn FocusSurface, id: ElementId) -> Option<ElementId> {
        if !surface.is_connected(id) {
            self.record(TrapDiagnostic::StaleCapturedFocus { element: id });
            return None;
        }
        if !surface.is_element(id) {
            self.record(TrapDiagnostic::InvalidHandle {
                element: id,
                role: HandleRole::CapturedFocus,
            });
            return None;
        }
        self.move_focus(surface, id)
    }

    fn move_focus(&mut self, surface: &mut dyn FocusSurface, id: ElementId) -> Option<ElementId> {
        if surface.focus(id) {
            Some(id)
        } else {
            self.record(TrapDiagnostic::FocusRejected { element: id });
            None
        }
    }

    fn live_container(&self, surface: &dyn FocusSurface) -> Option<ElementId> {
        self.container.filter(|c| surface.is_element(*c))
    }

    fn report_unavailable(&mut self) {
        if self.unavailable_reported {
            return;
        }
        self.unavailable_reported = true;
        self.record(TrapDiagnostic::ContainerUnavailable {
            container: self.container,
        });
    }

    fn record(&mut self, diag: TrapDiagnostic) {
        diag.emit();
        if self.diagnostics.len() == MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(diag);
    }
}
