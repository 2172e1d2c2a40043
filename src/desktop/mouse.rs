//! Mouse facade: animated moves, clicks, drags and scrolling

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::input::MouseButton;
use super::platform::Backend;
use super::types::Point;
use crate::config::Timings;
use crate::error::Result;

/// Easing curves over normalized progress `t` in `[0, 1]`
pub mod easing {
    pub fn linear(t: f64) -> f64 {
        t
    }

    pub fn ease_in_quad(t: f64) -> f64 {
        t * t
    }

    pub fn ease_out_quad(t: f64) -> f64 {
        1.0 - (1.0 - t) * (1.0 - t)
    }

    pub fn ease_in_out_cubic(t: f64) -> f64 {
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        }
    }
}

pub type Easing = fn(f64) -> f64;

pub struct Mouse {
    backend: Arc<dyn Backend>,
    timings: Timings,
}

impl Mouse {
    pub fn new(backend: Arc<dyn Backend>, timings: Timings) -> Self {
        Self { backend, timings }
    }

    pub fn position(&self) -> Result<Point> {
        self.backend.mouse_position()
    }

    /// Move to absolute coordinates, interpolating over `duration` when non-zero.
    ///
    /// Animated moves step at the configured rate (60/s by default, at least
    /// two steps) and sleep `duration / steps` after every intermediate move.
    pub fn move_to(&self, x: i32, y: i32, duration: Duration, easing: Option<Easing>) -> Result<()> {
        if duration.is_zero() {
            return self.backend.mouse_move_to(x, y);
        }

        let start = self.position()?;
        let steps = self.step_count(duration);
        let pause = duration / steps;
        tracing::trace!(
            "Animating mouse ({}, {}) -> ({}, {}) in {} steps",
            start.x,
            start.y,
            x,
            y,
            steps
        );

        for i in 0..=steps {
            let mut t = f64::from(i) / f64::from(steps);
            if let Some(ease) = easing {
                t = ease(t);
            }
            let current_x = lerp(start.x, x, t);
            let current_y = lerp(start.y, y, t);
            self.backend.mouse_move_to(current_x, current_y)?;
            thread::sleep(pause);
        }
        Ok(())
    }

    fn step_count(&self, duration: Duration) -> u32 {
        let steps = (duration.as_secs_f64() * f64::from(self.timings.move_rate)) as u32;
        steps.max(self.timings.min_move_steps.max(1))
    }

    /// `move_to` with a cubic ease-in-out curve
    pub fn smooth_move(&self, x: i32, y: i32, duration: Duration) -> Result<()> {
        self.move_to(x, y, duration, Some(easing::ease_in_out_cubic))
    }

    pub fn move_rel(&self, dx: i32, dy: i32, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            return self.backend.mouse_move_rel(dx, dy);
        }
        let target = self.position()? + Point::new(dx, dy);
        self.move_to(target.x, target.y, duration, None)
    }

    /// Press and release `clicks` times, holding each press briefly and
    /// waiting `interval` between clicks.
    pub fn click(&self, button: MouseButton, clicks: u32, interval: Duration) -> Result<()> {
        for i in 0..clicks {
            self.backend.mouse_press(button)?;
            thread::sleep(self.timings.click_hold);
            self.backend.mouse_release(button)?;
            if i + 1 < clicks {
                thread::sleep(interval);
            }
        }
        Ok(())
    }

    pub fn double_click(&self, button: MouseButton) -> Result<()> {
        self.click(button, 2, Duration::from_millis(100))
    }

    pub fn triple_click(&self, button: MouseButton) -> Result<()> {
        self.click(button, 3, Duration::from_millis(100))
    }

    pub fn right_click(&self) -> Result<()> {
        self.click(MouseButton::Right, 1, Duration::ZERO)
    }

    pub fn middle_click(&self) -> Result<()> {
        self.click(MouseButton::Middle, 1, Duration::ZERO)
    }

    pub fn press(&self, button: MouseButton) -> Result<()> {
        self.backend.mouse_press(button)
    }

    pub fn release(&self, button: MouseButton) -> Result<()> {
        self.backend.mouse_release(button)
    }

    pub fn is_pressed(&self, button: MouseButton) -> Result<bool> {
        self.backend.mouse_is_pressed(button)
    }

    /// Press at the current position, move (optionally animated), release.
    pub fn drag(&self, x: i32, y: i32, button: MouseButton, duration: Duration) -> Result<()> {
        tracing::debug!("Dragging with {:?} to ({}, {})", button, x, y);
        self.press(button)?;
        thread::sleep(self.timings.drag_settle);
        self.move_to(x, y, duration, None)?;
        thread::sleep(self.timings.drag_settle);
        self.release(button)
    }

    pub fn drag_rel(&self, dx: i32, dy: i32, button: MouseButton, duration: Duration) -> Result<()> {
        let target = self.position()? + Point::new(dx, dy);
        self.drag(target.x, target.y, button, duration)
    }

    /// Positive `dy` scrolls up, positive `dx` scrolls right.
    pub fn scroll(&self, dx: i32, dy: i32) -> Result<()> {
        self.backend.mouse_scroll(dx, dy)
    }

    pub fn scroll_up(&self, clicks: i32) -> Result<()> {
        self.scroll(0, clicks)
    }

    pub fn scroll_down(&self, clicks: i32) -> Result<()> {
        self.scroll(0, -clicks)
    }

    pub fn scroll_left(&self, clicks: i32) -> Result<()> {
        self.scroll(-clicks, 0)
    }

    pub fn scroll_right(&self, clicks: i32) -> Result<()> {
        self.scroll(clicks, 0)
    }
}

/// Interpolate in `f64` so the span between far-apart coordinates cannot overflow.
fn lerp(from: i32, to: i32, t: f64) -> i32 {
    let from = f64::from(from);
    (from + (f64::from(to) - from) * t) as i32
}
