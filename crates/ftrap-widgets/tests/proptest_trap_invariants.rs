//! Property-based invariant tests for the focus-trap engine.
//!
//! Each case builds a random dialog (a mix of focusable and inert children,
//! some nested), activates a trap on it, and drives random key and focus
//! sequences. Keys the engine does not consume get the document's native Tab
//! behaviour, the way a browser would apply it.
//!
//! 1. Containment: after any Tab or Shift+Tab, focus is inside the container.
//! 2. Wrap: forward from the last element lands on the first; backward from
//!    the first lands on the last. N presses in either direction from any
//!    element of an N-element set come back to that element.
//! 3. Pin: with one focusable element, Tab never moves focus.
//! 4. Outside correction: Tab with focus outside lands on the first element.
//! 5. Restore: deactivation returns focus to the element captured at
//!    activation.
//! 6. Listener pairing: registrations equal deregistrations once inactive.

use ftrap_core::{Document, ElementId, KeyCode, KeyEvent, Modifiers, Tag};
use ftrap_widgets::{FocusTrapEngine, FocusableSetResolver};
use proptest::prelude::*;
use tracing::Level;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Child {
    Button,
    TextInput,
    Link,
    Select,
    TextArea,
    TabStop,
    Paragraph,
    Skipped,
    DisabledButton,
    Details,
}

impl Child {
    fn shape(self) -> (Tag, &'static [(&'static str, &'static str)]) {
        match self {
            Self::Button => (Tag::Button, &[]),
            Self::TextInput => (Tag::Input, &[("type", "text")]),
            Self::Link => (Tag::A, &[("href", "/x")]),
            Self::Select => (Tag::Select, &[]),
            Self::TextArea => (Tag::TextArea, &[]),
            Self::TabStop => (Tag::Span, &[("tabindex", "0")]),
            Self::Paragraph => (Tag::P, &[]),
            Self::Skipped => (Tag::Span, &[("tabindex", "-1")]),
            Self::DisabledButton => (Tag::Button, &[("disabled", "")]),
            Self::Details => (Tag::Details, &[]),
        }
    }
}

fn child_strategy() -> impl Strategy<Value = Child> {
    prop_oneof![
        Just(Child::Button),
        Just(Child::TextInput),
        Just(Child::Link),
        Just(Child::Select),
        Just(Child::TextArea),
        Just(Child::TabStop),
        Just(Child::Paragraph),
        Just(Child::Skipped),
        Just(Child::DisabledButton),
        Just(Child::Details),
    ]
}

fn children_strategy() -> impl Strategy<Value = Vec<(Child, bool)>> {
    proptest::collection::vec((child_strategy(), any::<bool>()), 0..12)
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Tab,
    ShiftTab,
    FocusOutside,
    Blur,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => Just(Step::Tab),
        4 => Just(Step::ShiftTab),
        1 => Just(Step::FocusOutside),
        1 => Just(Step::Blur),
    ]
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::WARN)
        .try_init();
}

struct Scene {
    doc: Document,
    trigger: ElementId,
    container: ElementId,
    outside: ElementId,
}

fn build(children: &[(Child, bool)]) -> Scene {
    init_tracing();
    let mut doc = Document::new();
    let body = doc.body();
    let trigger = doc.append_element(body, Tag::Button, &[]).unwrap();
    let container = doc
        .append_element(body, Tag::Div, &[("tabindex", "-1")])
        .unwrap();
    let nest = doc.append_element(container, Tag::Div, &[]).unwrap();
    for (child, nested) in children {
        let (tag, attrs) = child.shape();
        let parent = if *nested { nest } else { container };
        let el = doc.append_element(parent, tag, attrs).unwrap();
        if matches!(child, Child::Details) {
            let summary = doc.append_element(el, Tag::Summary, &[]).unwrap();
            doc.append_text(summary, "more").unwrap();
        }
    }
    let outside = doc.append_element(body, Tag::Button, &[]).unwrap();
    Scene {
        doc,
        trigger,
        container,
        outside,
    }
}

fn activate(scene: &mut Scene) -> FocusTrapEngine {
    let container = scene.container;
    let mut engine = FocusTrapEngine::new().on_enter(move |surface, _| {
        surface.focus(container);
    });
    engine.set_container(&mut scene.doc, Some(scene.container));
    scene.doc.focus(scene.trigger);
    engine.set_activation(&mut scene.doc, true);
    engine
}

/// Offer `key` to the engine and fall back to native navigation.
fn press(engine: &mut FocusTrapEngine, doc: &mut Document, key: KeyEvent) {
    let outcome = engine.handle_gesture(doc, &key);
    if !outcome.consumed {
        doc.advance_focus(!key.shift());
    }
}

fn tab() -> KeyEvent {
    KeyEvent::new(KeyCode::Tab)
}

fn shift_tab() -> KeyEvent {
    KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Containment and 5/6. Restore + listener pairing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn focus_never_escapes_and_is_restored(
        children in children_strategy(),
        steps in proptest::collection::vec(step_strategy(), 1..40),
    ) {
        let mut scene = build(&children);
        let mut engine = activate(&mut scene);
        let set = FocusableSetResolver::new().resolve(&scene.doc, Some(scene.container));

        for step in steps {
            match step {
                Step::Tab => press(&mut engine, &mut scene.doc, tab()),
                Step::ShiftTab => press(&mut engine, &mut scene.doc, shift_tab()),
                Step::FocusOutside => {
                    scene.doc.focus(scene.outside);
                    continue;
                }
                Step::Blur => {
                    scene.doc.blur();
                    continue;
                }
            }
            if !set.is_empty() {
                let active = scene.doc.active_element();
                prop_assert!(
                    active.is_some_and(|a| scene.doc.contains(scene.container, a)),
                    "focus escaped to {:?}", active
                );
            }
        }

        engine.set_activation(&mut scene.doc, false);
        prop_assert_eq!(scene.doc.active_element(), Some(scene.trigger));
        prop_assert_eq!(
            engine.listener().registrations(),
            engine.listener().deregistrations()
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Wrap at both ends
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn boundaries_wrap(children in children_strategy()) {
        let mut scene = build(&children);
        let mut engine = activate(&mut scene);
        let set = FocusableSetResolver::new().resolve(&scene.doc, Some(scene.container));
        let (Some(first), Some(last)) = (set.first(), set.last()) else {
            return Ok(());
        };

        scene.doc.focus(last);
        press(&mut engine, &mut scene.doc, tab());
        prop_assert_eq!(scene.doc.active_element(), Some(first));

        scene.doc.focus(first);
        press(&mut engine, &mut scene.doc, shift_tab());
        prop_assert_eq!(scene.doc.active_element(), Some(last));

        scene.doc.focus(scene.container);
        press(&mut engine, &mut scene.doc, shift_tab());
        prop_assert_eq!(scene.doc.active_element(), Some(last));
    }
}

proptest! {
    #[test]
    fn full_cycle_returns_to_start(
        children in children_strategy(),
        pick in any::<usize>(),
        backward in any::<bool>(),
    ) {
        let mut scene = build(&children);
        let mut engine = activate(&mut scene);
        let set = FocusableSetResolver::new().resolve(&scene.doc, Some(scene.container));
        if set.is_empty() {
            return Ok(());
        }
        let start = set.as_slice()[pick % set.len()];
        prop_assert!(scene.doc.focus(start));

        let key = if backward { shift_tab() } else { tab() };
        for _ in 0..set.len() {
            press(&mut engine, &mut scene.doc, key);
            let active = scene.doc.active_element();
            prop_assert!(active.is_some_and(|a| set.contains(a)), "left the set at {:?}", active);
        }
        prop_assert_eq!(scene.doc.active_element(), Some(start));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Single element is pinned
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn single_element_pins(
        backward in proptest::collection::vec(any::<bool>(), 1..20),
        before in 0usize..4,
        after in 0usize..4,
    ) {
        let mut children = vec![(Child::Paragraph, false); before];
        children.push((Child::Button, false));
        children.extend(std::iter::repeat_n((Child::Skipped, true), after));
        let mut scene = build(&children);
        let mut engine = activate(&mut scene);
        let only = FocusableSetResolver::new()
            .resolve(&scene.doc, Some(scene.container))
            .first();
        prop_assert!(only.is_some());

        scene.doc.focus(only.unwrap());
        for back in backward {
            let key = if back { shift_tab() } else { tab() };
            press(&mut engine, &mut scene.doc, key);
            prop_assert_eq!(scene.doc.active_element(), only);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Outside correction
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn outside_focus_goes_to_first(
        children in children_strategy(),
        backward in any::<bool>(),
        blurred in any::<bool>(),
    ) {
        let mut scene = build(&children);
        let mut engine = activate(&mut scene);
        let set = FocusableSetResolver::new().resolve(&scene.doc, Some(scene.container));

        if blurred {
            scene.doc.blur();
        } else {
            scene.doc.focus(scene.outside);
        }
        let before = scene.doc.active_element();
        let key = if backward { shift_tab() } else { tab() };
        let outcome = engine.handle_gesture(&mut scene.doc, &key);

        prop_assert!(outcome.consumed);
        match set.first() {
            Some(first) => prop_assert_eq!(scene.doc.active_element(), Some(first)),
            None => prop_assert_eq!(scene.doc.active_element(), before),
        }
    }
}
