//! OS backend built on enigo (input), xcap (monitors, windows) and
//! cli-clipboard (text clipboard)
//!
//! Only what those crates expose is implemented. Key/button state queries,
//! keyboard layout and window mutation are reported as capability errors.

use std::collections::BTreeMap;

use cli_clipboard::{ClipboardContext, ClipboardProvider};
use enigo::{Axis, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use xcap::{Monitor, Window};

use super::Backend;
use crate::desktop::input::{Key, MouseButton};
use crate::desktop::types::{
    DisplayInfo, Point, Rect, Size, WindowHandle, WindowInfo, WindowState,
};
use crate::error::{AutomationError, Result};

const NAME: &str = "native";

#[cfg(target_os = "macos")]
const INPUT_HINT: &str =
    "Grant Accessibility access in System Settings > Privacy & Security > Accessibility.";
#[cfg(target_os = "linux")]
const INPUT_HINT: &str = "Make sure an X11 session is available and DISPLAY is set.";
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
const INPUT_HINT: &str = "Run the process in an interactive desktop session.";

/// Native desktop backend
///
/// A fresh enigo connection is opened per input call so the backend stays
/// `Send + Sync` on every platform.
pub struct NativeBackend {
    settings: Settings,
}

impl NativeBackend {
    pub fn new() -> Result<Self> {
        let backend = Self {
            settings: Settings::default(),
        };
        // Query once so missing permissions surface at startup
        backend.connect()?;
        tracing::debug!("Native backend ready");
        Ok(backend)
    }

    fn connect(&self) -> Result<Enigo> {
        Enigo::new(&self.settings).map_err(|e| {
            if cfg!(target_os = "macos") {
                AutomationError::permission_denied("input", INPUT_HINT)
            } else {
                AutomationError::BackendNotAvailable(format!(
                    "Failed to create input controller: {:?}. {}",
                    e, INPUT_HINT
                ))
            }
        })
    }

    fn input<T>(
        &self,
        what: &str,
        f: impl FnOnce(&mut Enigo) -> std::result::Result<T, enigo::InputError>,
    ) -> Result<T> {
        let mut enigo = self.connect()?;
        f(&mut enigo).map_err(|e| AutomationError::Backend(format!("Failed to {}: {:?}", what, e)))
    }

    fn clipboard(&self) -> Result<ClipboardContext> {
        ClipboardContext::new()
            .map_err(|e| AutomationError::Backend(format!("Failed to open clipboard: {}", e)))
    }

    fn monitors(&self) -> Result<Vec<Monitor>> {
        Monitor::all()
            .map_err(|e| AutomationError::Backend(format!("Failed to get monitors: {}", e)))
    }

    fn windows(&self) -> Result<Vec<Window>> {
        Window::all().map_err(|e| AutomationError::Backend(format!("Failed to get windows: {}", e)))
    }

    fn unsupported<T>(&self, feature: &str) -> Result<T> {
        Err(AutomationError::capability(feature, NAME))
    }
}

fn display_info(monitor: &Monitor) -> DisplayInfo {
    let bounds = Rect::new(
        monitor.x(),
        monitor.y(),
        monitor.width() as i32,
        monitor.height() as i32,
    );
    let scale = f64::from(monitor.scale_factor()).max(f64::MIN_POSITIVE);
    DisplayInfo {
        id: monitor.id().to_string(),
        name: monitor.name().to_string(),
        bounds,
        work_area: bounds,
        scale,
        physical_size: Size::new(
            (bounds.width as f64 * scale) as i32,
            (bounds.height as f64 * scale) as i32,
        ),
        refresh_rate: f64::from(monitor.frequency()),
        rotation: (monitor.rotation().rem_euclid(360.0) as u16 / 90) * 90,
        is_primary: monitor.is_primary(),
    }
}

fn window_info(window: &Window) -> WindowInfo {
    let rect = Rect::new(
        window.x(),
        window.y(),
        window.width() as i32,
        window.height() as i32,
    );
    let state = if window.is_minimized() {
        WindowState::Minimized
    } else if window.is_maximized() {
        WindowState::Maximized
    } else {
        WindowState::Normal
    };
    WindowInfo {
        handle: WindowHandle(u64::from(window.id())),
        title: window.title().to_string(),
        class_name: String::new(),
        pid: window.pid(),
        process_name: window.app_name().to_string(),
        rect,
        client_rect: rect,
        state,
        is_visible: state != WindowState::Minimized,
        is_active: false,
        is_always_on_top: false,
        opacity: 1.0,
        display: Some(display_info(&window.current_monitor())),
    }
}

impl Backend for NativeBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn mouse_position(&self) -> Result<Point> {
        let (x, y) = self.input("read mouse position", |e| e.location())?;
        Ok(Point::new(x, y))
    }

    fn mouse_move_to(&self, x: i32, y: i32) -> Result<()> {
        self.input("move mouse", |e| e.move_mouse(x, y, Coordinate::Abs))
    }

    fn mouse_move_rel(&self, dx: i32, dy: i32) -> Result<()> {
        self.input("move mouse", |e| e.move_mouse(dx, dy, Coordinate::Rel))
    }

    fn mouse_press(&self, button: MouseButton) -> Result<()> {
        self.input("press mouse button", |e| {
            e.button(button.to_enigo(), Direction::Press)
        })
    }

    fn mouse_release(&self, button: MouseButton) -> Result<()> {
        self.input("release mouse button", |e| {
            e.button(button.to_enigo(), Direction::Release)
        })
    }

    fn mouse_scroll(&self, dx: i32, dy: i32) -> Result<()> {
        self.input("scroll", |e| {
            if dx != 0 {
                e.scroll(dx, Axis::Horizontal)?;
            }
            if dy != 0 {
                // enigo scrolls down for positive values
                e.scroll(-dy, Axis::Vertical)?;
            }
            Ok(())
        })
    }

    fn mouse_is_pressed(&self, _button: MouseButton) -> Result<bool> {
        self.unsupported("mouse_is_pressed")
    }

    fn key_press(&self, key: Key) -> Result<()> {
        self.input("press key", |e| e.key(key.to_enigo(), Direction::Press))
    }

    fn key_release(&self, key: Key) -> Result<()> {
        self.input("release key", |e| e.key(key.to_enigo(), Direction::Release))
    }

    fn key_is_pressed(&self, _key: Key) -> Result<bool> {
        self.unsupported("key_is_pressed")
    }

    fn key_type_unicode(&self, text: &str) -> Result<()> {
        let mut enigo = self.connect()?;
        enigo.text(text).map_err(|e| match e {
            enigo::InputError::Mapping(what) => AutomationError::Unsynthesizable(what),
            other => AutomationError::Backend(format!("Failed to type text: {:?}", other)),
        })
    }

    fn keyboard_layout(&self) -> Result<String> {
        self.unsupported("keyboard_layout")
    }

    fn displays(&self) -> Result<Vec<DisplayInfo>> {
        Ok(self.monitors()?.iter().map(display_info).collect())
    }

    fn primary_display(&self) -> Result<DisplayInfo> {
        let displays = self.displays()?;
        displays
            .iter()
            .find(|d| d.is_primary)
            .or_else(|| displays.first())
            .cloned()
            .ok_or_else(|| AutomationError::DisplayNotFound("No primary monitor found".to_string()))
    }

    fn list_windows(&self, visible_only: bool) -> Result<Vec<WindowInfo>> {
        Ok(self
            .windows()?
            .iter()
            .map(window_info)
            .filter(|w| !visible_only || w.is_visible)
            .collect())
    }

    fn active_window(&self) -> Result<Option<WindowInfo>> {
        self.unsupported("active_window")
    }

    fn window_at(&self, x: i32, y: i32) -> Result<Option<WindowInfo>> {
        let point = Point::new(x, y);
        // xcap lists windows front to back
        Ok(self
            .list_windows(true)?
            .into_iter()
            .find(|w| w.rect.contains(point)))
    }

    fn focus_window(&self, _handle: WindowHandle) -> Result<()> {
        self.unsupported("window_focus")
    }

    fn close_window(&self, _handle: WindowHandle) -> Result<()> {
        self.unsupported("window_close")
    }

    fn move_window(&self, _handle: WindowHandle, _x: i32, _y: i32) -> Result<()> {
        self.unsupported("window_move")
    }

    fn resize_window(&self, _handle: WindowHandle, _width: i32, _height: i32) -> Result<()> {
        self.unsupported("window_resize")
    }

    fn set_window_state(&self, _handle: WindowHandle, _state: WindowState) -> Result<()> {
        self.unsupported("window_set_state")
    }

    fn window_state(&self, handle: WindowHandle) -> Result<WindowState> {
        self.list_windows(false)?
            .into_iter()
            .find(|w| w.handle == handle)
            .map(|w| w.state)
            .ok_or_else(|| AutomationError::WindowNotFound(handle.to_string()))
    }

    fn set_window_opacity(&self, _handle: WindowHandle, _opacity: f64) -> Result<()> {
        self.unsupported("window_opacity")
    }

    fn set_window_always_on_top(&self, _handle: WindowHandle, _enabled: bool) -> Result<()> {
        self.unsupported("window_always_on_top")
    }

    fn clipboard_get_text(&self) -> Result<String> {
        // An empty clipboard reads as an error on some platforms
        Ok(self.clipboard()?.get_contents().unwrap_or_default())
    }

    fn clipboard_set_text(&self, text: &str) -> Result<()> {
        self.clipboard()?
            .set_contents(text.to_string())
            .map_err(|e| AutomationError::Backend(format!("Failed to write clipboard: {}", e)))
    }

    fn clipboard_clear(&self) -> Result<()> {
        self.clipboard_set_text("")
    }

    fn clipboard_has_text(&self) -> Result<bool> {
        Ok(!self.clipboard_get_text()?.is_empty())
    }

    fn check_permissions(&self) -> Result<BTreeMap<String, bool>> {
        let mut permissions = BTreeMap::new();
        permissions.insert("input".to_string(), self.connect().is_ok());
        permissions.insert("screen".to_string(), self.monitors().is_ok());
        permissions.insert("windows".to_string(), self.windows().is_ok());
        permissions.insert("clipboard".to_string(), self.clipboard().is_ok());
        permissions.insert("hooks".to_string(), false);
        Ok(permissions)
    }
}
