use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::BackendKind;
use crate::error::{AutomationError, Result};

use super::input::{Key, MouseButton};
use super::types::{
    DisplayInfo, HookHandle, KeyboardCallback, MouseCallback, Point, Rect, WindowHandle,
    WindowInfo, WindowState,
};

pub mod memory;

#[cfg(feature = "native")]
pub mod native;

pub use memory::{BackendCall, MemoryBackend};

#[cfg(feature = "native")]
pub use native::NativeBackend;

/// Platform capability interface
///
/// Every facade and the macro engine talk to the OS only through this trait.
/// Implementations report unsupported features as `AutomationError::Capability`
/// and withheld OS permissions as `AutomationError::PermissionDenied`.
pub trait Backend: Send + Sync {
    /// Short backend name used in capability errors and logs
    fn name(&self) -> &str;

    // ============ Mouse ============

    fn mouse_position(&self) -> Result<Point>;

    fn mouse_move_to(&self, x: i32, y: i32) -> Result<()>;

    fn mouse_move_rel(&self, dx: i32, dy: i32) -> Result<()>;

    fn mouse_press(&self, button: MouseButton) -> Result<()>;

    fn mouse_release(&self, button: MouseButton) -> Result<()>;

    fn mouse_scroll(&self, dx: i32, dy: i32) -> Result<()>;

    fn mouse_is_pressed(&self, button: MouseButton) -> Result<bool>;

    // ============ Keyboard ============

    fn key_press(&self, key: Key) -> Result<()>;

    fn key_release(&self, key: Key) -> Result<()>;

    fn key_is_pressed(&self, key: Key) -> Result<bool>;

    /// Inject text as if typed. Fails with `Unsynthesizable` when the
    /// platform has no way to produce one of the code points.
    fn key_type_unicode(&self, text: &str) -> Result<()>;

    fn keyboard_layout(&self) -> Result<String>;

    // ============ Displays ============

    /// All displays, in an order that is stable until the topology changes
    fn displays(&self) -> Result<Vec<DisplayInfo>>;

    fn primary_display(&self) -> Result<DisplayInfo>;

    /// Minimal rectangle enclosing every display's bounds
    fn virtual_screen_rect(&self) -> Result<Rect> {
        let displays = self.displays()?;
        Ok(Rect::enclosing(displays.iter().map(|d| d.bounds)))
    }

    // ============ Windows ============

    fn list_windows(&self, visible_only: bool) -> Result<Vec<WindowInfo>>;

    fn active_window(&self) -> Result<Option<WindowInfo>>;

    fn window_at(&self, x: i32, y: i32) -> Result<Option<WindowInfo>>;

    fn focus_window(&self, handle: WindowHandle) -> Result<()>;

    fn close_window(&self, handle: WindowHandle) -> Result<()>;

    fn move_window(&self, handle: WindowHandle, x: i32, y: i32) -> Result<()>;

    fn resize_window(&self, handle: WindowHandle, width: i32, height: i32) -> Result<()>;

    fn set_window_state(&self, handle: WindowHandle, state: WindowState) -> Result<()>;

    fn window_state(&self, handle: WindowHandle) -> Result<WindowState>;

    fn set_window_opacity(&self, handle: WindowHandle, opacity: f64) -> Result<()>;

    fn set_window_always_on_top(&self, handle: WindowHandle, enabled: bool) -> Result<()>;

    // ============ Clipboard ============

    fn clipboard_get_text(&self) -> Result<String>;

    fn clipboard_set_text(&self, text: &str) -> Result<()>;

    fn clipboard_clear(&self) -> Result<()>;

    fn clipboard_has_text(&self) -> Result<bool>;

    // ============ Event hooks (optional) ============

    fn hook_mouse(&self, _callback: MouseCallback) -> Result<HookHandle> {
        Err(AutomationError::capability("mouse_hook", self.name()))
    }

    fn hook_keyboard(&self, _callback: KeyboardCallback) -> Result<HookHandle> {
        Err(AutomationError::capability("keyboard_hook", self.name()))
    }

    /// Must be callable from a thread other than the one that installed the hook
    fn unhook(&self, _handle: HookHandle) -> Result<()> {
        Err(AutomationError::capability("unhook", self.name()))
    }

    /// Capability name to granted flag
    fn check_permissions(&self) -> Result<BTreeMap<String, bool>>;
}

/// Create the backend selected by configuration
pub fn create_backend(kind: BackendKind) -> Result<Arc<dyn Backend>> {
    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        BackendKind::Native => create_native_backend(),
    }
}

#[cfg(all(
    feature = "native",
    any(target_os = "windows", target_os = "macos", target_os = "linux")
))]
fn create_native_backend() -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(NativeBackend::new()?))
}

#[cfg(not(feature = "native"))]
fn create_native_backend() -> Result<Arc<dyn Backend>> {
    Err(AutomationError::BackendNotAvailable(
        "built without the `native` feature".to_string(),
    ))
}

#[cfg(all(
    feature = "native",
    not(any(target_os = "windows", target_os = "macos", target_os = "linux"))
))]
fn create_native_backend() -> Result<Arc<dyn Backend>> {
    Err(AutomationError::BackendNotAvailable(
        "unsupported platform for desktop automation".to_string(),
    ))
}
