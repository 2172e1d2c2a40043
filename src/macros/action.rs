use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::context::MacroContext;
use crate::desktop::{Desktop, Key, MouseButton};
use crate::error::Result;

/// Branch/loop predicate evaluated against the run's context
pub type ConditionFn = Arc<dyn Fn(&MacroContext) -> bool + Send + Sync>;

/// User-supplied step
pub type CustomFn = Arc<dyn Fn(&Desktop, &mut MacroContext) -> Result<()> + Send + Sync>;

/// One node of a macro
///
/// `Repeat`, `Condition` and `Loop` own their children, so a macro is a tree
/// walked by [`execute`](super::execute).
#[derive(Clone)]
pub enum Action {
    MouseMove {
        x: i32,
        y: i32,
        duration: Duration,
    },
    MouseClick {
        button: MouseButton,
        clicks: u32,
        interval: Duration,
    },
    MouseDrag {
        x: i32,
        y: i32,
        button: MouseButton,
        duration: Duration,
    },
    MouseScroll {
        dx: i32,
        dy: i32,
    },
    KeyPress(Key),
    KeyRelease(Key),
    KeyTap {
        key: Key,
        times: u32,
        interval: Duration,
    },
    KeyWrite {
        text: String,
        interval: Duration,
    },
    KeyHotkey {
        keys: Vec<Key>,
        interval: Duration,
    },
    Wait(Duration),
    Repeat {
        actions: Vec<Action>,
        times: u32,
    },
    Condition {
        condition: ConditionFn,
        then: Vec<Action>,
        otherwise: Option<Vec<Action>>,
    },
    /// Runs while `condition` holds (forever when absent) and fewer than
    /// `max_iterations` passes have completed (no cap when absent).
    Loop {
        actions: Vec<Action>,
        condition: Option<ConditionFn>,
        max_iterations: Option<u32>,
    },
    Custom {
        name: String,
        run: CustomFn,
    },
}

impl Action {
    /// Instant move
    pub fn mouse_move(x: i32, y: i32) -> Self {
        Action::MouseMove {
            x,
            y,
            duration: Duration::ZERO,
        }
    }

    /// Single click with the default 100ms multi-click interval
    pub fn click(button: MouseButton) -> Self {
        Action::MouseClick {
            button,
            clicks: 1,
            interval: Duration::from_millis(100),
        }
    }

    pub fn tap(key: Key) -> Self {
        Action::KeyTap {
            key,
            times: 1,
            interval: Duration::from_millis(50),
        }
    }

    pub fn write(text: impl Into<String>) -> Self {
        Action::KeyWrite {
            text: text.into(),
            interval: Duration::ZERO,
        }
    }

    pub fn hotkey(keys: &[Key]) -> Self {
        Action::KeyHotkey {
            keys: keys.to_vec(),
            interval: Duration::from_millis(10),
        }
    }

    pub fn wait(duration: Duration) -> Self {
        Action::Wait(duration)
    }

    pub fn repeat(actions: Vec<Action>, times: u32) -> Self {
        Action::Repeat { actions, times }
    }

    pub fn condition(
        condition: impl Fn(&MacroContext) -> bool + Send + Sync + 'static,
        then: Vec<Action>,
        otherwise: Option<Vec<Action>>,
    ) -> Self {
        Action::Condition {
            condition: Arc::new(condition),
            then,
            otherwise,
        }
    }

    pub fn loop_while(
        condition: impl Fn(&MacroContext) -> bool + Send + Sync + 'static,
        actions: Vec<Action>,
    ) -> Self {
        Action::Loop {
            actions,
            condition: Some(Arc::new(condition)),
            max_iterations: None,
        }
    }

    /// Loop with only an iteration cap; stops early only through the stop flag
    pub fn loop_n(actions: Vec<Action>, max_iterations: u32) -> Self {
        Action::Loop {
            actions,
            condition: None,
            max_iterations: Some(max_iterations),
        }
    }

    pub fn custom(
        name: impl Into<String>,
        run: impl Fn(&Desktop, &mut MacroContext) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Action::Custom {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    /// Short variant name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::MouseMove { .. } => "mouse_move",
            Action::MouseClick { .. } => "mouse_click",
            Action::MouseDrag { .. } => "mouse_drag",
            Action::MouseScroll { .. } => "mouse_scroll",
            Action::KeyPress(_) => "key_press",
            Action::KeyRelease(_) => "key_release",
            Action::KeyTap { .. } => "key_tap",
            Action::KeyWrite { .. } => "key_write",
            Action::KeyHotkey { .. } => "key_hotkey",
            Action::Wait(_) => "wait",
            Action::Repeat { .. } => "repeat",
            Action::Condition { .. } => "condition",
            Action::Loop { .. } => "loop",
            Action::Custom { .. } => "custom",
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::MouseMove { x, y, duration } => f
                .debug_struct("MouseMove")
                .field("x", x)
                .field("y", y)
                .field("duration", duration)
                .finish(),
            Action::MouseClick {
                button,
                clicks,
                interval,
            } => f
                .debug_struct("MouseClick")
                .field("button", button)
                .field("clicks", clicks)
                .field("interval", interval)
                .finish(),
            Action::MouseDrag {
                x,
                y,
                button,
                duration,
            } => f
                .debug_struct("MouseDrag")
                .field("x", x)
                .field("y", y)
                .field("button", button)
                .field("duration", duration)
                .finish(),
            Action::MouseScroll { dx, dy } => f
                .debug_struct("MouseScroll")
                .field("dx", dx)
                .field("dy", dy)
                .finish(),
            Action::KeyPress(key) => f.debug_tuple("KeyPress").field(key).finish(),
            Action::KeyRelease(key) => f.debug_tuple("KeyRelease").field(key).finish(),
            Action::KeyTap {
                key,
                times,
                interval,
            } => f
                .debug_struct("KeyTap")
                .field("key", key)
                .field("times", times)
                .field("interval", interval)
                .finish(),
            Action::KeyWrite { text, interval } => f
                .debug_struct("KeyWrite")
                .field("text", text)
                .field("interval", interval)
                .finish(),
            Action::KeyHotkey { keys, interval } => f
                .debug_struct("KeyHotkey")
                .field("keys", keys)
                .field("interval", interval)
                .finish(),
            Action::Wait(duration) => f.debug_tuple("Wait").field(duration).finish(),
            Action::Repeat { actions, times } => f
                .debug_struct("Repeat")
                .field("actions", actions)
                .field("times", times)
                .finish(),
            Action::Condition {
                then, otherwise, ..
            } => f
                .debug_struct("Condition")
                .field("then", then)
                .field("otherwise", otherwise)
                .finish_non_exhaustive(),
            Action::Loop {
                actions,
                condition,
                max_iterations,
            } => f
                .debug_struct("Loop")
                .field("actions", actions)
                .field("conditional", &condition.is_some())
                .field("max_iterations", max_iterations)
                .finish(),
            Action::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_closures() {
        let action = Action::condition(
            |_| true,
            vec![Action::custom("noop", |_, _| Ok(()))],
            None,
        );
        let text = format!("{:?}", action);
        assert!(text.starts_with("Condition"), "{}", text);
        assert!(text.contains("Custom { name: \"noop\", .. }"), "{}", text);
    }

    #[test]
    fn test_constructor_defaults() {
        match Action::hotkey(&[Key::Control, Key::Char('c')]) {
            Action::KeyHotkey { keys, interval } => {
                assert_eq!(keys, vec![Key::Control, Key::Char('c')]);
                assert_eq!(interval, Duration::from_millis(10));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(Action::loop_n(vec![], 3).kind(), "loop");
        assert_eq!(Action::write("x").kind(), "key_write");
    }
}
