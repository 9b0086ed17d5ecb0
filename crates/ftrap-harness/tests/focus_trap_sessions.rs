//! End-to-end focus-trap sessions.
//!
//! Each test mounts a reference app in a [`Session`], drives it with clicks
//! and keys, and checks where focus ends up. Set `FTRAP_JSONL=1` to print the
//! key transcript of each session.

use ftrap_core::{ElementId, Event, KeyCode, KeyEvent, Tag};
use ftrap_harness::fixtures::{ConditionalTrapApp, DialogApp, empty_content};
use ftrap_harness::{App, HarnessError, Session};
use ftrap_widgets::{ActivationState, TrapConfig, TrapDiagnostic};
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

fn dump<A: App>(name: &str, session: &Session<A>) {
    if std::env::var("FTRAP_JSONL").is_ok() {
        eprintln!("== {name}\n{}", session.transcript_jsonl());
    }
}

struct Opened {
    session: Session<DialogApp>,
    trigger: ElementId,
    panel: ElementId,
    button: ElementId,
    input: ElementId,
    label: ElementId,
    link: ElementId,
}

fn open_dialog() -> Result<Opened, HarnessError> {
    init_tracing();
    let mut session = Session::mount(DialogApp::default())?;
    let trigger = session.app().trigger().unwrap();
    let panel = session.app().panel().unwrap();

    assert!(session.focus(trigger));
    assert_eq!(session.focused(), Some(trigger));
    session.click(trigger)?;

    let content = session.app().content().to_vec();
    assert_eq!(content.len(), 4);
    Ok(Opened {
        session,
        trigger,
        panel,
        button: content[0],
        input: content[1],
        label: content[2],
        link: content[3],
    })
}

#[test]
fn tab_cycles_inside_dialog_and_escape_restores_trigger() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        trigger,
        panel,
        button,
        input,
        link,
        ..
    } = open_dialog()?;

    assert!(session.app().is_open());
    assert_eq!(session.focused(), Some(panel));

    assert_eq!(session.tab()?.focused, Some(button));
    assert_eq!(session.tab()?.focused, Some(input));
    assert_eq!(session.tab()?.focused, Some(link));

    let wrap = session.tab()?;
    assert_eq!(wrap.focused, Some(button));
    assert!(wrap.outcome.is_some_and(|o| o.consumed));
    assert!(!wrap.native);

    session.keyboard("{Escape}")?;
    assert!(!session.app().is_open());
    assert!(session.app().content().is_empty());
    assert!(!session.document().is_alive(link));
    assert_eq!(session.focused(), Some(trigger));

    dump("tab_cycle", &session);
    Ok(())
}

#[test]
fn shift_tab_moves_backward_from_panel() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        panel,
        input,
        link,
        ..
    } = open_dialog()?;
    assert_eq!(session.focused(), Some(panel));

    let first = session.shift_tab()?;
    assert_eq!(first.focused, Some(link));
    assert!(first.outcome.is_some_and(|o| o.consumed));

    let second = session.shift_tab()?;
    assert_eq!(second.focused, Some(input));
    assert!(second.native);

    dump("shift_tab", &session);
    Ok(())
}

#[test]
fn shift_tab_from_first_wraps_to_last() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        button,
        link,
        ..
    } = open_dialog()?;
    session.tab()?;
    assert_eq!(session.focused(), Some(button));
    assert_eq!(session.keyboard("{Shift>}{Tab}{/Shift}")?[0].focused, Some(link));
    Ok(())
}

#[test]
fn label_is_never_focused() -> Result<(), HarnessError> {
    let Opened {
        mut session, label, ..
    } = open_dialog()?;
    for _ in 0..10 {
        let report = session.tab()?;
        assert_ne!(report.focused, Some(label));
    }
    Ok(())
}

#[test]
fn focus_leaving_the_document_is_pulled_back() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        button,
        ..
    } = open_dialog()?;

    session.dispatch(Event::Focus(false))?;
    assert_eq!(session.focused(), None);

    let report = session.tab()?;
    assert_eq!(report.focused, Some(button));
    assert!(report.outcome.is_some_and(|o| o.consumed));
    Ok(())
}

#[test]
fn clicking_outside_then_tabbing_returns_inside() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        trigger,
        button,
        ..
    } = open_dialog()?;

    session.click(trigger)?;
    assert_eq!(session.focused(), Some(trigger));
    assert!(session.app().is_open());

    session.shift_tab()?;
    assert_eq!(session.focused(), Some(button));
    Ok(())
}

#[test]
fn escape_twice_signals_once() -> Result<(), HarnessError> {
    let Opened { mut session, .. } = open_dialog()?;
    let reports = session.keyboard("{Escape}{Escape}")?;
    assert!(reports[0].outcome.is_some_and(|o| o.exit_signaled));
    // Closed by the first press; the second reaches an inactive trap.
    assert!(!reports[1].outcome.is_some_and(|o| o.exit_signaled));
    Ok(())
}

#[test]
fn other_keys_pass_through() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        panel,
        ..
    } = open_dialog()?;
    let reports = session.keyboard("ab{Enter}{ArrowDown}")?;
    for report in &reports {
        assert!(report.outcome.is_some_and(|o| !o.consumed && !o.exit_signaled));
        assert!(!report.native);
    }
    assert_eq!(session.focused(), Some(panel));
    assert!(session.app().is_open());
    Ok(())
}

#[test]
fn empty_dialog_holds_focus_on_panel() -> Result<(), HarnessError> {
    init_tracing();
    let mut session = Session::mount(DialogApp::new(empty_content))?;
    let trigger = session.app().trigger().unwrap();
    let panel = session.app().panel().unwrap();
    session.click(trigger)?;
    assert_eq!(session.focused(), Some(panel));

    for report in [session.tab()?, session.shift_tab()?] {
        assert!(report.outcome.is_some_and(|o| o.consumed && o.moved_to.is_none()));
        assert_eq!(report.focused, Some(panel));
    }
    assert!(session.app().host().engine().diagnostics().any(|d| matches!(
        d,
        TrapDiagnostic::EmptyFocusableSet { container } if *container == panel
    )));

    session.escape()?;
    assert_eq!(session.focused(), Some(trigger));
    Ok(())
}

#[test]
fn without_wrap_boundaries_hold() -> Result<(), HarnessError> {
    init_tracing();
    let app = DialogApp::with_config(
        ftrap_harness::fixtures::standard_content,
        TrapConfig::new().with_wrap(false),
    );
    let mut session = Session::mount(app)?;
    let trigger = session.app().trigger().unwrap();
    session.click(trigger)?;
    let reports = session.keyboard("{Tab}{Tab}{Tab}{Tab}{Tab}")?;
    let link = session.app().content()[3];
    assert_eq!(reports[3].focused, Some(link));
    assert_eq!(reports[4].focused, Some(link));
    assert!(reports[4].outcome.is_some_and(|o| o.consumed));
    Ok(())
}

#[test]
fn removed_trigger_is_not_restored() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        trigger,
        button,
        ..
    } = open_dialog()?;
    session.tab()?;
    assert_eq!(session.focused(), Some(button));

    session.document_mut().remove(trigger)?;
    session.escape()?;
    assert_eq!(session.focused(), None);
    assert!(session.app().host().engine().diagnostics().any(|d| matches!(
        d,
        TrapDiagnostic::StaleCapturedFocus { element } if *element == trigger
    )));
    Ok(())
}

#[test]
fn reopening_starts_a_fresh_session() -> Result<(), HarnessError> {
    let Opened {
        mut session,
        trigger,
        panel,
        ..
    } = open_dialog()?;
    session.escape()?;
    assert_eq!(session.focused(), Some(trigger));

    session.click(trigger)?;
    assert_eq!(session.focused(), Some(panel));
    let engine = session.app().host().engine();
    assert_eq!(engine.state(), ActivationState::Active);
    assert_eq!(engine.captured_focus(), Some(trigger));
    assert_eq!(engine.listener().registrations(), 2);

    session.escape()?;
    assert_eq!(session.focused(), Some(trigger));
    Ok(())
}

#[test]
fn conditional_trap_focuses_after_ref_attaches() -> Result<(), HarnessError> {
    init_tracing();
    let mut session = Session::mount(ConditionalTrapApp::new())?;
    let trigger = session.app().trigger().unwrap();
    assert!(session.app().container().is_none());
    assert!(!session.app().host().is_ready());

    session.focus(trigger);
    session.click(trigger)?;
    let items = session.app().items().to_vec();
    assert_eq!(items.len(), 2);
    assert_eq!(session.document().text(session.document().children(items[0])[0]), Some("1"));
    assert_eq!(session.focused(), Some(items[0]));

    session.keyboard("{Escape}")?;
    assert!(session.app().container().is_none());
    assert!(!session.document().is_alive(items[0]));
    assert_eq!(session.focused(), Some(trigger));

    dump("conditional", &session);
    Ok(())
}

#[test]
fn conditional_trap_wraps_between_two_buttons() -> Result<(), HarnessError> {
    let mut session = Session::mount(ConditionalTrapApp::new())?;
    let trigger = session.app().trigger().unwrap();
    session.click(trigger)?;
    let items = session.app().items().to_vec();

    assert_eq!(session.tab()?.focused, Some(items[1]));
    assert_eq!(session.tab()?.focused, Some(items[0]));
    assert_eq!(session.shift_tab()?.focused, Some(items[1]));
    Ok(())
}

#[test]
fn conditional_trap_closes_from_toggle_click() -> Result<(), HarnessError> {
    let mut session = Session::mount(ConditionalTrapApp::new())?;
    let trigger = session.app().trigger().unwrap();
    session.click(trigger)?;
    assert!(session.app().host().engine().is_active());

    session.click(trigger)?;
    assert!(!session.app().host().engine().is_active());
    assert!(!session.app().host().engine().is_listening());
    assert_eq!(session.focused(), Some(trigger));
    Ok(())
}

#[test]
fn unmount_restores_and_stops_listening() -> Result<(), HarnessError> {
    let Opened {
        session,
        trigger,
        ..
    } = open_dialog()?;
    let doc = session.unmount();
    assert_eq!(doc.active_element(), Some(trigger));
    Ok(())
}

#[test]
fn bad_key_script_presses_nothing() {
    let mut session = Session::mount(DialogApp::default()).unwrap();
    let err = session.keyboard("{Tab}{Nope}").unwrap_err();
    assert!(matches!(err, HarnessError::KeyScript(_)));
    assert!(session.transcript().is_empty());
}

#[test]
fn transcript_is_jsonl() -> Result<(), HarnessError> {
    let Opened { mut session, .. } = open_dialog()?;
    session.tab()?;
    session.press(KeyEvent::new(KeyCode::Escape))?;

    let text = session.transcript_jsonl();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["step"], 0);
    assert_eq!(first["gesture"], "AdvanceForward");
    assert_eq!(first["native"], true);
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["exit_signaled"], true);
    Ok(())
}

#[test]
fn app_without_trap_uses_native_tab_only() -> Result<(), HarnessError> {
    #[derive(Debug, Default)]
    struct Plain {
        buttons: Vec<ElementId>,
    }
    impl App for Plain {
        fn mount(&mut self, doc: &mut ftrap_core::Document) -> Result<(), ftrap_core::TreeError> {
            let body = doc.body();
            for _ in 0..2 {
                self.buttons.push(doc.append_element(body, Tag::Button, &[])?);
            }
            Ok(())
        }
        fn update(&mut self, _doc: &mut ftrap_core::Document) -> Result<(), ftrap_core::TreeError> {
            Ok(())
        }
    }

    let mut session = Session::mount(Plain::default())?;
    let buttons = session.app().buttons.clone();
    let a = session.tab()?;
    assert!(a.outcome.is_none());
    assert_eq!(a.focused, Some(buttons[0]));
    assert_eq!(session.tab()?.focused, Some(buttons[1]));
    assert_eq!(session.tab()?.focused, None);
    Ok(())
}
