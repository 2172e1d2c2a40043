use std::collections::BTreeMap;
use std::sync::Arc;

use super::clipboard::Clipboard;
use super::display::Display;
use super::events::Events;
use super::keyboard::Keyboard;
use super::mouse::Mouse;
use super::platform::{create_backend, Backend};
use super::window::Window;
use crate::config::{Config, Timings};
use crate::error::Result;

/// Desktop automation context
///
/// Owns one backend reference and one instance of each facade. Build one per
/// host and pass it around instead of reaching for globals; it is
/// `Send + Sync` and can be shared behind an `Arc`.
pub struct Desktop {
    backend: Arc<dyn Backend>,
    mouse: Mouse,
    keyboard: Keyboard,
    display: Display,
    window: Window,
    clipboard: Clipboard,
    events: Events,
}

impl Desktop {
    /// Create a desktop context over `backend` with default timings
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_timings(backend, Timings::default())
    }

    pub fn with_timings(backend: Arc<dyn Backend>, timings: Timings) -> Self {
        tracing::debug!("Creating desktop context on {} backend", backend.name());
        Self {
            mouse: Mouse::new(backend.clone(), timings),
            keyboard: Keyboard::new(backend.clone(), timings),
            display: Display::new(backend.clone()),
            window: Window::new(backend.clone()),
            clipboard: Clipboard::new(backend.clone()),
            events: Events::new(backend.clone()),
            backend,
        }
    }

    /// Build the backend named by `config` and wrap it
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = create_backend(config.backend)?;
        Ok(Self::with_timings(backend, config.timings))
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn mouse(&self) -> &Mouse {
        &self.mouse
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    pub fn check_permissions(&self) -> Result<BTreeMap<String, bool>> {
        self.backend.check_permissions()
    }
}
