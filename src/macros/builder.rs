use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::action::Action;
use super::context::{MacroContext, StopHandle};
use super::executor::execute;
use crate::desktop::{Desktop, Key, MouseButton};
use crate::error::Result;

/// Named, ordered sequence of actions
///
/// A macro holds no run state: every run gets a fresh [`MacroContext`].
#[derive(Debug, Clone)]
pub struct Macro {
    name: String,
    actions: Vec<Action>,
}

impl Macro {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn add(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn extend(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn wait(self, duration: Duration) -> Self {
        self.add(Action::Wait(duration))
    }

    pub fn wait_ms(self, millis: u64) -> Self {
        self.wait(Duration::from_millis(millis))
    }

    pub fn move_to(self, x: i32, y: i32) -> Self {
        self.add(Action::mouse_move(x, y))
    }

    pub fn move_to_over(self, x: i32, y: i32, duration: Duration) -> Self {
        self.add(Action::MouseMove { x, y, duration })
    }

    pub fn click(self, button: MouseButton) -> Self {
        self.add(Action::click(button))
    }

    pub fn double_click(self, button: MouseButton) -> Self {
        self.add(Action::MouseClick {
            button,
            clicks: 2,
            interval: Duration::from_millis(100),
        })
    }

    pub fn drag_to(self, x: i32, y: i32, button: MouseButton, duration: Duration) -> Self {
        self.add(Action::MouseDrag {
            x,
            y,
            button,
            duration,
        })
    }

    pub fn scroll(self, dx: i32, dy: i32) -> Self {
        self.add(Action::MouseScroll { dx, dy })
    }

    pub fn press(self, key: Key) -> Self {
        self.add(Action::KeyPress(key))
    }

    pub fn release(self, key: Key) -> Self {
        self.add(Action::KeyRelease(key))
    }

    pub fn tap(self, key: Key) -> Self {
        self.add(Action::tap(key))
    }

    pub fn type_text(self, text: impl Into<String>) -> Self {
        self.add(Action::write(text))
    }

    pub fn type_text_slowly(self, text: impl Into<String>, interval: Duration) -> Self {
        self.add(Action::KeyWrite {
            text: text.into(),
            interval,
        })
    }

    pub fn hotkey(self, keys: &[Key]) -> Self {
        self.add(Action::hotkey(keys))
    }

    pub fn custom(
        self,
        name: impl Into<String>,
        run: impl Fn(&Desktop, &mut MacroContext) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.add(Action::custom(name, run))
    }

    /// Run once with a fresh context seeded from `variables`.
    ///
    /// Returns the final context so callers can read back variables. The
    /// first failing action aborts the run.
    pub fn run(&self, desktop: &Desktop, variables: HashMap<String, Value>) -> Result<MacroContext> {
        self.run_with_stop(desktop, variables, StopHandle::new())
    }

    /// Like [`run`](Self::run), but observing a caller-owned stop flag. A
    /// handle that is already stopped runs nothing.
    pub fn run_with_stop(
        &self,
        desktop: &Desktop,
        variables: HashMap<String, Value>,
        stop: StopHandle,
    ) -> Result<MacroContext> {
        let mut ctx = MacroContext::with_variables(self.name.clone(), variables, stop);
        let total = self.actions.len();
        tracing::debug!("Starting macro '{}' with {} actions", self.name, total);

        for (idx, action) in self.actions.iter().enumerate() {
            if ctx.is_stopped() {
                tracing::info!(
                    "Macro '{}' stopped before action {}/{}",
                    self.name,
                    idx + 1,
                    total
                );
                break;
            }
            tracing::trace!("Processing action {}/{}: {}", idx + 1, total, action.kind());
            if let Err(e) = execute(action, desktop, &mut ctx) {
                tracing::debug!("Macro '{}' failed at action {}: {}", self.name, idx + 1, e);
                return Err(e);
            }
        }

        tracing::debug!("Macro '{}' finished", self.name);
        Ok(ctx)
    }

    /// Run the whole macro `times` times, each with a new empty context.
    pub fn repeat(&self, desktop: &Desktop, times: u32) -> Result<()> {
        for _ in 0..times {
            self.run(desktop, HashMap::new())?;
        }
        Ok(())
    }
}
