//! Integration tests for the macro engine.
//!
//! Macros run against the in-memory backend, so every side effect is
//! observable through the recorded call log.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

use deskauto::desktop::{
    Backend, BackendCall, Desktop, Key, KeyboardEvent, MemoryBackend, MouseButton, Point,
    WindowHandle,
};
use deskauto::macros::{Action, Macro, StopHandle};
use deskauto::AutomationError;

fn setup() -> (Arc<MemoryBackend>, Desktop) {
    let backend = Arc::new(MemoryBackend::new());
    let desktop = Desktop::new(backend.clone());
    (backend, desktop)
}

fn increment(name: &'static str) -> Action {
    Action::custom(format!("increment {}", name), move |_, ctx| {
        ctx.increment(name, 1);
        Ok(())
    })
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_leaf_actions_run_once_in_order() {
    let (backend, desktop) = setup();
    let m = Macro::new("fill-form")
        .move_to(10, 10)
        .click(MouseButton::Left)
        .type_text("jane@example.com")
        .tap(Key::Tab)
        .hotkey(&[Key::Control, Key::Char('v')])
        .scroll(0, -3);

    m.run(&desktop, HashMap::new()).unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::MouseMoveTo(10, 10),
            BackendCall::MousePress(MouseButton::Left),
            BackendCall::MouseRelease(MouseButton::Left),
            BackendCall::TypeUnicode("jane@example.com".to_string()),
            BackendCall::KeyPress(Key::Tab),
            BackendCall::KeyRelease(Key::Tab),
            BackendCall::KeyPress(Key::Control),
            BackendCall::KeyPress(Key::Char('v')),
            BackendCall::KeyRelease(Key::Char('v')),
            BackendCall::KeyRelease(Key::Control),
            BackendCall::MouseScroll(0, -3),
        ],
        "Each leaf action should reach the backend exactly once, in order"
    );
}

#[test]
fn test_same_macro_twice_is_identical() {
    let (backend, desktop) = setup();
    let m = Macro::new("twice")
        .move_to(3, 4)
        .drag_to(30, 40, MouseButton::Left, Duration::ZERO);

    m.run(&desktop, HashMap::new()).unwrap();
    let first = backend.calls();
    backend.clear_calls();
    backend.set_cursor(0, 0);
    m.run(&desktop, HashMap::new()).unwrap();

    assert_eq!(first, backend.calls());
}

#[test]
fn test_stop_inside_action_k_skips_the_rest() {
    let (backend, desktop) = setup();
    let m = Macro::new("partial")
        .move_to(1, 0)
        .move_to(2, 0)
        .custom("halt", |desktop, ctx| {
            desktop.mouse().move_to(3, 0, Duration::ZERO, None)?;
            ctx.stop();
            Ok(())
        })
        .move_to(4, 0)
        .move_to(5, 0);

    let ctx = m.run(&desktop, HashMap::new()).unwrap();

    assert!(ctx.is_stopped());
    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::MouseMoveTo(1, 0),
            BackendCall::MouseMoveTo(2, 0),
            BackendCall::MouseMoveTo(3, 0),
        ]
    );
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_repeat_five_times() {
    let (_, desktop) = setup();
    let ctx = Macro::new("repeat")
        .add(Action::repeat(vec![increment("counter")], 5))
        .run(&desktop, HashMap::new())
        .unwrap();
    assert_eq!(ctx.get_i64("counter"), Some(5));
}

#[test]
fn test_loop_while_counter_below_three() {
    let (_, desktop) = setup();
    let ctx = Macro::new("loop")
        .add(Action::loop_while(
            |ctx| ctx.get_i64("counter").unwrap_or(0) < 3,
            vec![increment("counter")],
        ))
        .run(&desktop, HashMap::new())
        .unwrap();
    assert_eq!(ctx.get_i64("counter"), Some(3));
}

#[test]
fn test_condition_with_and_without_else() {
    let (_, desktop) = setup();
    let set = |name: &'static str| {
        Action::custom(name, move |_, ctx| {
            ctx.set(name, true);
            Ok(())
        })
    };

    let ctx = Macro::new("no-else")
        .add(Action::condition(|_| false, vec![set("then")], None))
        .run(&desktop, HashMap::new())
        .unwrap();
    assert!(!ctx.contains("then"), "False condition without else runs nothing");

    let ctx = Macro::new("with-else")
        .add(Action::condition(
            |_| false,
            vec![set("then")],
            Some(vec![set("else")]),
        ))
        .run(&desktop, HashMap::new())
        .unwrap();
    assert!(!ctx.contains("then"));
    assert_eq!(ctx.get_bool("else"), Some(true));
}

#[test]
fn test_condition_driven_by_seed_variables() {
    let (backend, desktop) = setup();
    let m = Macro::new("branch").add(Action::condition(
        |ctx| ctx.get_str("platform") == Some("mac"),
        vec![Action::hotkey(&[Key::Meta, Key::Char('c')])],
        Some(vec![Action::hotkey(&[Key::Control, Key::Char('c')])]),
    ));

    let vars = HashMap::from([("platform".to_string(), json!("mac"))]);
    m.run(&desktop, vars).unwrap();
    assert_eq!(backend.calls()[0], BackendCall::KeyPress(Key::Meta));

    backend.clear_calls();
    m.run(&desktop, HashMap::new()).unwrap();
    assert_eq!(backend.calls()[0], BackendCall::KeyPress(Key::Control));
}

#[test]
fn test_stop_propagates_out_of_nested_composites() {
    let (_, desktop) = setup();
    let inner = Action::loop_n(
        vec![
            increment("inner"),
            Action::condition(
                |ctx| ctx.get_i64("inner") == Some(2),
                vec![Action::custom("stop", |_, ctx| {
                    ctx.stop();
                    Ok(())
                })],
                None,
            ),
        ],
        10,
    );
    let ctx = Macro::new("nested")
        .add(Action::repeat(vec![inner, increment("outer")], 3))
        .add(increment("after"))
        .run(&desktop, HashMap::new())
        .unwrap();

    assert_eq!(ctx.get_i64("inner"), Some(2));
    assert!(!ctx.contains("outer"));
    assert!(!ctx.contains("after"));
}

// ============================================================================
// Errors and stop handles
// ============================================================================

#[test]
fn test_backend_error_aborts_run() {
    let (backend, desktop) = setup();
    backend.fail("key_press");
    let err = Macro::new("fails")
        .move_to(1, 1)
        .tap(Key::Enter)
        .move_to(2, 2)
        .run(&desktop, HashMap::new())
        .unwrap_err();

    assert!(matches!(err, AutomationError::Backend(_)));
    assert_eq!(backend.mouse_position().unwrap(), Point::new(1, 1));
}

#[test]
fn test_window_not_found_inside_custom_action() {
    let (_, desktop) = setup();
    let err = Macro::new("focus-missing")
        .custom("focus", |desktop, _| {
            desktop.window().focus(WindowHandle(0xdead))
        })
        .run(&desktop, HashMap::new())
        .unwrap_err();
    assert!(matches!(err, AutomationError::WindowNotFound(_)));
}

#[test]
fn test_stop_handle_from_another_thread() {
    let (_, desktop) = setup();
    let stop = StopHandle::new();
    let remote = stop.clone();

    let m = Macro::new("forever").add(Action::Loop {
        actions: vec![increment("ticks"), Action::wait(Duration::from_millis(5))],
        condition: None,
        max_iterations: None,
    });

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.stop();
    });

    let started = Instant::now();
    let ctx = m.run_with_stop(&desktop, HashMap::new(), stop).unwrap();
    stopper.join().unwrap();

    assert!(ctx.is_stopped());
    assert!(ctx.get_i64("ticks").unwrap_or(0) >= 1);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_hook_callback_stops_macro() {
    let (backend, desktop) = setup();
    let stop = StopHandle::new();
    let on_escape = stop.clone();
    desktop
        .events()
        .on_keyboard(move |event| {
            if event.key == Key::Escape && event.pressed {
                on_escape.stop();
            }
            true
        })
        .unwrap();

    let hook_backend = backend.clone();
    let m = Macro::new("escape")
        .add(increment("before"))
        .custom("user presses escape", move |_, _| {
            hook_backend.emit_keyboard(&KeyboardEvent::new(Key::Escape, true, vec![]));
            Ok(())
        })
        .add(increment("after"));

    let ctx = m.run_with_stop(&desktop, HashMap::new(), stop).unwrap();
    assert_eq!(ctx.get_i64("before"), Some(1));
    assert!(!ctx.contains("after"));
    desktop.events().unhook_all().unwrap();
}

#[test]
fn test_repeat_runs_with_fresh_contexts() {
    let (backend, desktop) = setup();
    let m = Macro::new("fresh")
        .custom("first-run-only", |desktop, ctx| {
            if ctx.contains("seen") {
                return Err(anyhow::anyhow!("context leaked between runs").into());
            }
            ctx.set("seen", true);
            desktop.keyboard().write("x", Duration::ZERO)
        });

    m.repeat(&desktop, 4).unwrap();
    assert_eq!(backend.typed_text(), "xxxx");
}
