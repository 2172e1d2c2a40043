use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Which backend `create_backend` should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OS input/display/window/clipboard access (requires the `native` feature)
    #[default]
    Native,
    /// Record-based in-memory fake
    Memory,
}

impl BackendKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" | "os" => Some(BackendKind::Native),
            "memory" | "mock" | "fake" => Some(BackendKind::Memory),
            _ => None,
        }
    }
}

/// Fixed delays and rates used by the mouse and keyboard facades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Interpolation rate for animated mouse moves, in steps per second
    pub move_rate: u32,
    /// Lower bound on interpolation steps for any animated move
    pub min_move_steps: u32,
    /// How long a button is held down per click
    pub click_hold: Duration,
    /// Pause after pressing and before releasing during a drag
    pub drag_settle: Duration,
    /// How long a key is held down per tap
    pub tap_hold: Duration,
    /// Pause between the last hotkey press and the first release
    pub hotkey_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            move_rate: 60,
            min_move_steps: 2,
            click_hold: Duration::from_millis(20),
            drag_settle: Duration::from_millis(50),
            tap_hold: Duration::from_millis(10),
            hotkey_settle: Duration::from_millis(20),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub backend: BackendKind,
    pub timings: Timings,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Timings::default();
        Self {
            backend: env::var("DESKAUTO_BACKEND")
                .ok()
                .and_then(|b| BackendKind::parse(&b))
                .unwrap_or_default(),
            timings: Timings {
                move_rate: env::var("DESKAUTO_MOVE_RATE")
                    .ok()
                    .and_then(|r| r.parse().ok())
                    .filter(|r| *r > 0)
                    .unwrap_or(defaults.move_rate),
                min_move_steps: defaults.min_move_steps,
                click_hold: millis_from_env("DESKAUTO_CLICK_HOLD_MS").unwrap_or(defaults.click_hold),
                drag_settle: millis_from_env("DESKAUTO_DRAG_SETTLE_MS")
                    .unwrap_or(defaults.drag_settle),
                tap_hold: millis_from_env("DESKAUTO_TAP_HOLD_MS").unwrap_or(defaults.tap_hold),
                hotkey_settle: millis_from_env("DESKAUTO_HOTKEY_SETTLE_MS")
                    .unwrap_or(defaults.hotkey_settle),
            },
        }
    }
}

fn millis_from_env(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!(BackendKind::parse("Memory"), Some(BackendKind::Memory));
        assert_eq!(BackendKind::parse(" native "), Some(BackendKind::Native));
        assert_eq!(BackendKind::parse("x11"), None);
    }

    #[test]
    fn test_default_timings() {
        let t = Timings::default();
        assert_eq!(t.move_rate, 60);
        assert_eq!(t.min_move_steps, 2);
        assert_eq!(t.click_hold, Duration::from_millis(20));
        assert_eq!(t.drag_settle, Duration::from_millis(50));
        assert_eq!(t.tap_hold, Duration::from_millis(10));
        assert_eq!(t.hotkey_settle, Duration::from_millis(20));
    }

    #[test]
    fn test_from_env_overrides() {
        env::set_var("DESKAUTO_BACKEND", "memory");
        env::set_var("DESKAUTO_CLICK_HOLD_MS", "5");
        env::set_var("DESKAUTO_MOVE_RATE", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.timings.click_hold, Duration::from_millis(5));
        assert_eq!(config.timings.move_rate, 60);

        env::remove_var("DESKAUTO_BACKEND");
        env::remove_var("DESKAUTO_CLICK_HOLD_MS");
        env::remove_var("DESKAUTO_MOVE_RATE");
    }
}
