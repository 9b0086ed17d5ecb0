#![forbid(unsafe_code)]

//! Host adapter for late-bound containers.
//!
//! UI frameworks often render the trap container conditionally, so the
//! element does not exist when the component that owns the trap is built.
//! [`FocusTrapHost`] pairs the engine with two observable inputs:
//!
//! - `should_trap`: the caller's activation flag.
//! - `container`: a [`RefBinding`] the render pass fills once the container
//!   element has been attached.
//!
//! The engine is only told to activate when both are set, so `on_enter`
//! always sees a real container. Changes to either input mark the host dirty;
//! the host applies them in [`FocusTrapHost::commit`], which the render loop
//! calls after each update.

use std::cell::Cell;
use std::rc::Rc;

use ftrap_core::{ElementId, FocusSurface, KeyEvent};
use ftrap_runtime::{Observable, RefBinding, Subscription};

use super::config::TrapConfig;
use super::resolver::FocusableSet;
use super::trap::{FocusTrapEngine, GestureOutcome};

/// A focus trap wired to reactive activation and container inputs.
#[derive(Debug)]
pub struct FocusTrapHost {
    engine: FocusTrapEngine,
    should_trap: Observable<bool>,
    container: RefBinding<ElementId>,
    dirty: Rc<Cell<bool>>,
    _subscriptions: Vec<Subscription>,
}

impl Default for FocusTrapHost {
    fn default() -> Self {
        Self::new(TrapConfig::default())
    }
}

impl FocusTrapHost {
    #[must_use]
    pub fn new(config: TrapConfig) -> Self {
        Self::with_bindings(
            FocusTrapEngine::with_config(config),
            Observable::new(false),
            RefBinding::new(),
        )
    }

    /// Wrap an existing engine around caller-owned inputs.
    #[must_use]
    pub fn with_bindings(
        engine: FocusTrapEngine,
        should_trap: Observable<bool>,
        container: RefBinding<ElementId>,
    ) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let on_flag = Rc::clone(&dirty);
        let on_ref = Rc::clone(&dirty);
        let subscriptions = vec![
            should_trap.subscribe(move |_| on_flag.set(true)),
            container.on_change(move |_| on_ref.set(true)),
        ];
        Self {
            engine,
            should_trap,
            container,
            dirty,
            _subscriptions: subscriptions,
        }
    }

    /// Clear `should_trap` when the exit key is pressed.
    #[must_use]
    pub fn close_on_exit(mut self) -> Self {
        let flag = self.should_trap.clone();
        self.engine.set_on_exit(move || {
            flag.set(false);
        });
        self
    }

    pub fn set_on_enter(
        &mut self,
        hook: impl FnMut(&mut dyn FocusSurface, &FocusableSet) + 'static,
    ) {
        self.engine.set_on_enter(hook);
    }

    pub fn set_on_exit(&mut self, hook: impl FnMut() + 'static) {
        self.engine.set_on_exit(hook);
    }

    // --- Inputs ---

    /// Handle to the activation flag. Clones share state.
    #[must_use]
    pub fn should_trap(&self) -> Observable<bool> {
        self.should_trap.clone()
    }

    /// Handle to the container slot. Clones share state.
    #[must_use]
    pub fn container_ref(&self) -> RefBinding<ElementId> {
        self.container.clone()
    }

    pub fn set_should_trap(&self, value: bool) {
        self.should_trap.set(value);
    }

    /// Render-pass hook: the container element now exists.
    pub fn attach_container(&self, container: ElementId) {
        self.container.attach(container);
    }

    /// Render-pass hook: the container element is gone.
    pub fn detach_container(&self) -> Option<ElementId> {
        self.container.detach()
    }

    /// Container bound.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.container.is_bound()
    }

    /// What the engine should be doing: `should_trap && is_ready`.
    #[must_use]
    pub fn effective_activation(&self) -> bool {
        self.should_trap.get() && self.is_ready()
    }

    /// An input changed since the last commit.
    #[must_use]
    pub fn needs_commit(&self) -> bool {
        self.dirty.get()
    }

    // --- Driving ---

    /// Apply pending input changes to the engine. Returns whether the
    /// engine's activation state changed.
    ///
    /// Activation binds the container first so `on_enter` can see it.
    /// Deactivation restores focus before the new binding is applied.
    pub fn commit(&mut self, surface: &mut dyn FocusSurface) -> bool {
        if !self.dirty.replace(false) {
            return false;
        }
        let container = self.container.current();
        let effective = self.effective_activation();
        tracing::trace!(effective, ?container, "focus trap host commit");
        if effective {
            self.engine.set_container(surface, container);
            self.engine.set_activation(surface, true)
        } else {
            let changed = self.engine.set_activation(surface, false);
            self.engine.set_container(surface, container);
            changed
        }
    }

    /// Offer a key event to the trap.
    pub fn handle_key(&mut self, surface: &mut dyn FocusSurface, key: &KeyEvent) -> GestureOutcome {
        self.engine.handle_gesture(surface, key)
    }

    /// The owning component is going away.
    pub fn unmount(&mut self, surface: &mut dyn FocusSurface) {
        self.container.detach();
        self.engine.teardown(surface);
        self.dirty.set(false);
    }

    #[must_use]
    pub fn engine(&self) -> &FocusTrapEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FocusTrapEngine {
        &mut self.engine
    }
}
