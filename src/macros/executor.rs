use std::thread;

use super::action::Action;
use super::context::MacroContext;
use crate::desktop::Desktop;
use crate::error::Result;

/// Execute one action (and, for composites, its children) against `desktop`.
///
/// The stop flag is checked before every `Repeat`/`Loop` pass and after every
/// child action; in-flight sleeps and backend calls are never interrupted.
/// The first error aborts and propagates.
pub fn execute(action: &Action, desktop: &Desktop, ctx: &mut MacroContext) -> Result<()> {
    tracing::trace!("Executing {}", action.kind());
    match action {
        Action::MouseMove { x, y, duration } => desktop.mouse().move_to(*x, *y, *duration, None),
        Action::MouseClick {
            button,
            clicks,
            interval,
        } => desktop.mouse().click(*button, *clicks, *interval),
        Action::MouseDrag {
            x,
            y,
            button,
            duration,
        } => desktop.mouse().drag(*x, *y, *button, *duration),
        Action::MouseScroll { dx, dy } => desktop.mouse().scroll(*dx, *dy),
        Action::KeyPress(key) => desktop.keyboard().press(*key),
        Action::KeyRelease(key) => desktop.keyboard().release(*key),
        Action::KeyTap {
            key,
            times,
            interval,
        } => desktop.keyboard().tap(*key, *times, *interval),
        Action::KeyWrite { text, interval } => desktop.keyboard().write(text, *interval),
        Action::KeyHotkey { keys, interval } => desktop.keyboard().hotkey(keys, *interval),
        Action::Wait(duration) => {
            thread::sleep(*duration);
            Ok(())
        }
        Action::Repeat { actions, times } => {
            for i in 0..*times {
                if ctx.is_stopped() {
                    tracing::info!("Repeat stopped after {}/{} iterations", i, times);
                    break;
                }
                run_children(actions, desktop, ctx)?;
            }
            Ok(())
        }
        Action::Condition {
            condition,
            then,
            otherwise,
        } => {
            let branch = if condition(&*ctx) {
                Some(then)
            } else {
                otherwise.as_ref()
            };
            match branch {
                Some(actions) => run_children(actions, desktop, ctx),
                None => Ok(()),
            }
        }
        Action::Loop {
            actions,
            condition,
            max_iterations,
        } => {
            let mut iterations: u32 = 0;
            loop {
                if ctx.is_stopped() {
                    tracing::info!("Loop stopped after {} iterations", iterations);
                    break;
                }
                if let Some(condition) = condition {
                    if !condition(&*ctx) {
                        break;
                    }
                }
                if let Some(max) = max_iterations {
                    if iterations >= *max {
                        break;
                    }
                }

                run_children(actions, desktop, ctx)?;
                // A pass cut short by a stop still counts
                iterations = iterations.saturating_add(1);
            }
            tracing::trace!("Loop finished after {} iterations", iterations);
            Ok(())
        }
        Action::Custom { name, run } => {
            tracing::trace!("Running custom action '{}'", name);
            run(desktop, ctx)
        }
    }
}

/// Run `actions` in order, leaving early once a stop is requested.
fn run_children(actions: &[Action], desktop: &Desktop, ctx: &mut MacroContext) -> Result<()> {
    for action in actions {
        execute(action, desktop, ctx)?;
        if ctx.is_stopped() {
            break;
        }
    }
    Ok(())
}
