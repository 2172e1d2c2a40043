//! Record-based in-memory backend
//!
//! Keeps a simulated cursor, key state, clipboard, display layout and window
//! list, and records every side-effecting call in order. Used as the test
//! seam for the facades and the macro engine, and as a dry-run backend.
//! Long dry runs should call `set_recording(false)` so the call log and typed
//! text stop growing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Backend;
use crate::desktop::input::{Key, MouseButton};
use crate::desktop::types::{
    DisplayInfo, HookHandle, KeyboardCallback, KeyboardEvent, MouseCallback, MouseEvent, Point,
    Rect, Size, WindowHandle, WindowInfo, WindowState,
};
use crate::error::{AutomationError, Result};

/// One recorded side effect
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    MouseMoveTo(i32, i32),
    MouseMoveRel(i32, i32),
    MousePress(MouseButton),
    MouseRelease(MouseButton),
    MouseScroll(i32, i32),
    KeyPress(Key),
    KeyRelease(Key),
    TypeUnicode(String),
    FocusWindow(WindowHandle),
    CloseWindow(WindowHandle),
    MoveWindow(WindowHandle, i32, i32),
    ResizeWindow(WindowHandle, i32, i32),
    SetWindowState(WindowHandle, WindowState),
    SetWindowOpacity(WindowHandle, f64),
    SetWindowAlwaysOnTop(WindowHandle, bool),
    ClipboardSet(String),
    ClipboardClear,
}

type SharedMouseCallback = Arc<dyn Fn(&MouseEvent) -> bool + Send + Sync>;
type SharedKeyboardCallback = Arc<dyn Fn(&KeyboardEvent) -> bool + Send + Sync>;

struct MemoryState {
    cursor: Point,
    pressed_buttons: HashSet<MouseButton>,
    pressed_keys: HashSet<Key>,
    typed: String,
    clipboard: String,
    layout: String,
    displays: Vec<DisplayInfo>,
    windows: Vec<WindowInfo>,
    active: Option<WindowHandle>,
    calls: Vec<BackendCall>,
    failing: HashSet<String>,
    unsupported: HashSet<String>,
    unsynthesizable: HashSet<char>,
    recording: bool,
    mouse_hooks: HashMap<HookHandle, SharedMouseCallback>,
    keyboard_hooks: HashMap<HookHandle, SharedKeyboardCallback>,
    next_hook: u64,
}

/// In-memory fake satisfying the full `Backend` contract
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Two side-by-side 1920x1080 displays, no windows, cursor at the origin
    pub fn new() -> Self {
        Self::with_displays(default_displays())
    }

    pub fn with_displays(displays: Vec<DisplayInfo>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                cursor: Point::default(),
                pressed_buttons: HashSet::new(),
                pressed_keys: HashSet::new(),
                typed: String::new(),
                clipboard: String::new(),
                layout: "en_US".to_string(),
                displays,
                windows: Vec::new(),
                active: None,
                calls: Vec::new(),
                failing: HashSet::new(),
                unsupported: HashSet::new(),
                unsynthesizable: HashSet::new(),
                recording: true,
                mouse_hooks: HashMap::new(),
                keyboard_hooks: HashMap::new(),
                next_hook: 1,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the state after checking fault injection for `op`.
    fn enter(&self, op: &str) -> Result<MutexGuard<'_, MemoryState>> {
        let state = self.state();
        if state.failing.contains(op) {
            return Err(AutomationError::Backend(format!("injected failure: {}", op)));
        }
        if state.unsupported.contains(op) {
            return Err(AutomationError::capability(op, "memory"));
        }
        Ok(state)
    }

    // ============ Test controls ============

    /// Make every later call to `op` (a trait method name) fail
    pub fn fail(&self, op: &str) {
        self.state().failing.insert(op.to_string());
    }

    /// Make every later call to `op` report a capability error
    pub fn unsupported(&self, op: &str) {
        self.state().unsupported.insert(op.to_string());
    }

    /// Make `key_type_unicode` reject text containing any of `chars`
    pub fn set_unsynthesizable(&self, chars: impl IntoIterator<Item = char>) {
        self.state().unsynthesizable.extend(chars);
    }

    /// Turn the call log and typed-text capture on or off (on by default)
    pub fn set_recording(&self, enabled: bool) {
        self.state().recording = enabled;
    }

    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.failing.clear();
        state.unsupported.clear();
        state.unsynthesizable.clear();
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Everything injected through `key_type_unicode`, concatenated
    pub fn typed_text(&self) -> String {
        self.state().typed.clone()
    }

    pub fn set_cursor(&self, x: i32, y: i32) {
        self.state().cursor = Point::new(x, y);
    }

    pub fn set_layout(&self, layout: impl Into<String>) {
        self.state().layout = layout.into();
    }

    pub fn set_displays(&self, displays: Vec<DisplayInfo>) {
        self.state().displays = displays;
    }

    pub fn add_window(&self, window: WindowInfo) {
        let mut state = self.state();
        if window.is_active {
            state.active = Some(window.handle);
        }
        state.windows.push(window);
    }

    pub fn set_windows(&self, windows: Vec<WindowInfo>) {
        let mut state = self.state();
        state.active = windows.iter().find(|w| w.is_active).map(|w| w.handle);
        state.windows = windows;
    }

    /// Deliver a mouse event to installed hooks; returns whether it propagates.
    pub fn emit_mouse(&self, event: &MouseEvent) -> bool {
        let hooks: Vec<SharedMouseCallback> = self.state().mouse_hooks.values().cloned().collect();
        hooks.iter().fold(true, |propagate, hook| hook(event) && propagate)
    }

    /// Deliver a keyboard event to installed hooks; returns whether it propagates.
    pub fn emit_keyboard(&self, event: &KeyboardEvent) -> bool {
        let hooks: Vec<SharedKeyboardCallback> =
            self.state().keyboard_hooks.values().cloned().collect();
        hooks.iter().fold(true, |propagate, hook| hook(event) && propagate)
    }

    pub fn hook_count(&self) -> usize {
        let state = self.state();
        state.mouse_hooks.len() + state.keyboard_hooks.len()
    }

    fn with_window<T>(
        &self,
        op: &str,
        handle: WindowHandle,
        call: BackendCall,
        f: impl FnOnce(&mut WindowInfo) -> T,
    ) -> Result<T> {
        let mut state = self.enter(op)?;
        let window = state
            .windows
            .iter_mut()
            .find(|w| w.handle == handle)
            .ok_or_else(|| AutomationError::WindowNotFound(handle.to_string()))?;
        let out = f(window);
        state.record(call);
        Ok(out)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn record(&mut self, call: BackendCall) {
        if self.recording {
            self.calls.push(call);
        }
    }

    fn snapshot(&self, window: &WindowInfo) -> WindowInfo {
        let mut info = window.clone();
        info.is_active = self.active == Some(window.handle);
        info.display = self
            .displays
            .iter()
            .find(|d| d.bounds.contains(window.rect.center()))
            .cloned();
        info
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn mouse_position(&self) -> Result<Point> {
        Ok(self.enter("mouse_position")?.cursor)
    }

    fn mouse_move_to(&self, x: i32, y: i32) -> Result<()> {
        let mut state = self.enter("mouse_move_to")?;
        state.cursor = Point::new(x, y);
        state.record(BackendCall::MouseMoveTo(x, y));
        Ok(())
    }

    fn mouse_move_rel(&self, dx: i32, dy: i32) -> Result<()> {
        let mut state = self.enter("mouse_move_rel")?;
        state.cursor = state.cursor + Point::new(dx, dy);
        state.record(BackendCall::MouseMoveRel(dx, dy));
        Ok(())
    }

    fn mouse_press(&self, button: MouseButton) -> Result<()> {
        let mut state = self.enter("mouse_press")?;
        state.pressed_buttons.insert(button);
        state.record(BackendCall::MousePress(button));
        Ok(())
    }

    fn mouse_release(&self, button: MouseButton) -> Result<()> {
        let mut state = self.enter("mouse_release")?;
        state.pressed_buttons.remove(&button);
        state.record(BackendCall::MouseRelease(button));
        Ok(())
    }

    fn mouse_scroll(&self, dx: i32, dy: i32) -> Result<()> {
        let mut state = self.enter("mouse_scroll")?;
        state.record(BackendCall::MouseScroll(dx, dy));
        Ok(())
    }

    fn mouse_is_pressed(&self, button: MouseButton) -> Result<bool> {
        Ok(self.enter("mouse_is_pressed")?.pressed_buttons.contains(&button))
    }

    fn key_press(&self, key: Key) -> Result<()> {
        let mut state = self.enter("key_press")?;
        state.pressed_keys.insert(key);
        state.record(BackendCall::KeyPress(key));
        Ok(())
    }

    fn key_release(&self, key: Key) -> Result<()> {
        let mut state = self.enter("key_release")?;
        state.pressed_keys.remove(&key);
        state.record(BackendCall::KeyRelease(key));
        Ok(())
    }

    fn key_is_pressed(&self, key: Key) -> Result<bool> {
        Ok(self.enter("key_is_pressed")?.pressed_keys.contains(&key))
    }

    fn key_type_unicode(&self, text: &str) -> Result<()> {
        let mut state = self.enter("key_type_unicode")?;
        if let Some(c) = text.chars().find(|c| state.unsynthesizable.contains(c)) {
            return Err(AutomationError::Unsynthesizable(format!(
                "no key sequence produces {:?}",
                c
            )));
        }
        if state.recording {
            state.typed.push_str(text);
        }
        state.record(BackendCall::TypeUnicode(text.to_string()));
        Ok(())
    }

    fn keyboard_layout(&self) -> Result<String> {
        Ok(self.enter("keyboard_layout")?.layout.clone())
    }

    fn displays(&self) -> Result<Vec<DisplayInfo>> {
        Ok(self.enter("displays")?.displays.clone())
    }

    fn primary_display(&self) -> Result<DisplayInfo> {
        let state = self.enter("primary_display")?;
        state
            .displays
            .iter()
            .find(|d| d.is_primary)
            .or_else(|| state.displays.first())
            .cloned()
            .ok_or_else(|| AutomationError::DisplayNotFound("no displays attached".to_string()))
    }

    fn list_windows(&self, visible_only: bool) -> Result<Vec<WindowInfo>> {
        let state = self.enter("list_windows")?;
        Ok(state
            .windows
            .iter()
            .filter(|w| !visible_only || w.is_visible)
            .map(|w| state.snapshot(w))
            .collect())
    }

    fn active_window(&self) -> Result<Option<WindowInfo>> {
        let state = self.enter("active_window")?;
        Ok(state
            .active
            .and_then(|handle| state.windows.iter().find(|w| w.handle == handle))
            .map(|w| state.snapshot(w)))
    }

    fn window_at(&self, x: i32, y: i32) -> Result<Option<WindowInfo>> {
        let state = self.enter("window_at")?;
        let point = Point::new(x, y);
        Ok(state
            .windows
            .iter()
            .find(|w| w.is_visible && w.state != WindowState::Minimized && w.rect.contains(point))
            .map(|w| state.snapshot(w)))
    }

    fn focus_window(&self, handle: WindowHandle) -> Result<()> {
        self.with_window("focus_window", handle, BackendCall::FocusWindow(handle), |_| ())?;
        self.state().active = Some(handle);
        Ok(())
    }

    fn close_window(&self, handle: WindowHandle) -> Result<()> {
        self.with_window("close_window", handle, BackendCall::CloseWindow(handle), |_| ())?;
        let mut state = self.state();
        state.windows.retain(|w| w.handle != handle);
        if state.active == Some(handle) {
            state.active = None;
        }
        Ok(())
    }

    fn move_window(&self, handle: WindowHandle, x: i32, y: i32) -> Result<()> {
        self.with_window("move_window", handle, BackendCall::MoveWindow(handle, x, y), |w| {
            let (dx, dy) = (x - w.rect.x, y - w.rect.y);
            w.rect.x = x;
            w.rect.y = y;
            w.client_rect.x += dx;
            w.client_rect.y += dy;
        })
    }

    fn resize_window(&self, handle: WindowHandle, width: i32, height: i32) -> Result<()> {
        self.with_window(
            "resize_window",
            handle,
            BackendCall::ResizeWindow(handle, width, height),
            |w| {
                w.client_rect.width += width - w.rect.width;
                w.client_rect.height += height - w.rect.height;
                w.rect.width = width;
                w.rect.height = height;
            },
        )
    }

    fn set_window_state(&self, handle: WindowHandle, state: WindowState) -> Result<()> {
        self.with_window(
            "set_window_state",
            handle,
            BackendCall::SetWindowState(handle, state),
            |w| w.state = state,
        )
    }

    fn window_state(&self, handle: WindowHandle) -> Result<WindowState> {
        let state = self.enter("window_state")?;
        state
            .windows
            .iter()
            .find(|w| w.handle == handle)
            .map(|w| w.state)
            .ok_or_else(|| AutomationError::WindowNotFound(handle.to_string()))
    }

    fn set_window_opacity(&self, handle: WindowHandle, opacity: f64) -> Result<()> {
        self.with_window(
            "set_window_opacity",
            handle,
            BackendCall::SetWindowOpacity(handle, opacity),
            |w| w.opacity = opacity,
        )
    }

    fn set_window_always_on_top(&self, handle: WindowHandle, enabled: bool) -> Result<()> {
        self.with_window(
            "set_window_always_on_top",
            handle,
            BackendCall::SetWindowAlwaysOnTop(handle, enabled),
            |w| w.is_always_on_top = enabled,
        )
    }

    fn clipboard_get_text(&self) -> Result<String> {
        Ok(self.enter("clipboard_get_text")?.clipboard.clone())
    }

    fn clipboard_set_text(&self, text: &str) -> Result<()> {
        let mut state = self.enter("clipboard_set_text")?;
        state.clipboard = text.to_string();
        state.record(BackendCall::ClipboardSet(text.to_string()));
        Ok(())
    }

    fn clipboard_clear(&self) -> Result<()> {
        let mut state = self.enter("clipboard_clear")?;
        state.clipboard.clear();
        state.record(BackendCall::ClipboardClear);
        Ok(())
    }

    fn clipboard_has_text(&self) -> Result<bool> {
        Ok(!self.enter("clipboard_has_text")?.clipboard.is_empty())
    }

    fn hook_mouse(&self, callback: MouseCallback) -> Result<HookHandle> {
        let mut state = self.enter("hook_mouse")?;
        let handle = HookHandle(state.next_hook);
        state.next_hook += 1;
        state.mouse_hooks.insert(handle, Arc::from(callback));
        Ok(handle)
    }

    fn hook_keyboard(&self, callback: KeyboardCallback) -> Result<HookHandle> {
        let mut state = self.enter("hook_keyboard")?;
        let handle = HookHandle(state.next_hook);
        state.next_hook += 1;
        state.keyboard_hooks.insert(handle, Arc::from(callback));
        Ok(handle)
    }

    fn unhook(&self, handle: HookHandle) -> Result<()> {
        let mut state = self.enter("unhook")?;
        state.mouse_hooks.remove(&handle);
        state.keyboard_hooks.remove(&handle);
        Ok(())
    }

    fn check_permissions(&self) -> Result<BTreeMap<String, bool>> {
        let state = self.enter("check_permissions")?;
        Ok(["input", "screen", "windows", "clipboard", "hooks"]
            .into_iter()
            .map(|name| (name.to_string(), !state.failing.contains(name)))
            .collect())
    }
}

/// Primary 1920x1080 at the origin with a 2x display to its right
pub fn default_displays() -> Vec<DisplayInfo> {
    vec![
        DisplayInfo {
            id: "display0".to_string(),
            name: "Main Display".to_string(),
            bounds: Rect::new(0, 0, 1920, 1080),
            work_area: Rect::new(0, 0, 1920, 1040),
            scale: 1.0,
            physical_size: Size::new(1920, 1080),
            refresh_rate: 60.0,
            rotation: 0,
            is_primary: true,
        },
        DisplayInfo {
            id: "display1".to_string(),
            name: "Secondary Display".to_string(),
            bounds: Rect::new(1920, 0, 1920, 1080),
            work_area: Rect::new(1920, 0, 1920, 1040),
            scale: 2.0,
            physical_size: Size::new(3840, 2160),
            refresh_rate: 60.0,
            rotation: 0,
            is_primary: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let backend = MemoryBackend::new();
        backend.mouse_move_to(10, 20).unwrap();
        backend.mouse_press(MouseButton::Left).unwrap();
        backend.key_type_unicode("hi").unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::MouseMoveTo(10, 20),
                BackendCall::MousePress(MouseButton::Left),
                BackendCall::TypeUnicode("hi".to_string()),
            ]
        );
        assert!(backend.mouse_is_pressed(MouseButton::Left).unwrap());
        assert_eq!(backend.mouse_position().unwrap(), Point::new(10, 20));
    }

    #[test]
    fn test_fault_injection() {
        let backend = MemoryBackend::new();
        backend.fail("mouse_move_to");
        assert!(matches!(
            backend.mouse_move_to(1, 1),
            Err(AutomationError::Backend(_))
        ));

        backend.unsupported("hook_mouse");
        let err = backend.hook_mouse(Box::new(|_| true)).unwrap_err();
        assert!(err.is_unsupported());

        backend.clear_faults();
        backend.mouse_move_to(1, 1).unwrap();
    }

    #[test]
    fn test_unsynthesizable_chars() {
        let backend = MemoryBackend::new();
        backend.set_unsynthesizable(['ψ']);
        let err = backend.key_type_unicode("aψ").unwrap_err();
        assert!(matches!(err, AutomationError::Unsynthesizable(_)));
        assert!(backend.calls().is_empty());

        backend.key_type_unicode("ab").unwrap();
        assert_eq!(backend.typed_text(), "ab");
    }

    #[test]
    fn test_recording_can_be_disabled() {
        let backend = MemoryBackend::new();
        backend.set_recording(false);
        backend.mouse_move_to(4, 2).unwrap();
        backend.key_type_unicode("dry run").unwrap();

        assert!(backend.calls().is_empty());
        assert_eq!(backend.typed_text(), "");
        // Simulated state still tracks
        assert_eq!(backend.mouse_position().unwrap(), Point::new(4, 2));

        backend.set_recording(true);
        backend.mouse_press(MouseButton::Left).unwrap();
        assert_eq!(backend.calls(), vec![BackendCall::MousePress(MouseButton::Left)]);
    }

    #[test]
    fn test_virtual_screen_rect_default_impl() {
        let backend = MemoryBackend::new();
        assert_eq!(
            backend.virtual_screen_rect().unwrap(),
            Rect::new(0, 0, 3840, 1080)
        );
    }

    #[test]
    fn test_hooks_decide_propagation() {
        let backend = MemoryBackend::new();
        let allow = backend.hook_mouse(Box::new(|_| true)).unwrap();
        assert!(backend.emit_mouse(&MouseEvent::motion(Point::new(1, 1))));

        let block = backend
            .hook_mouse(Box::new(|e| e.button != Some(MouseButton::Right)))
            .unwrap();
        assert!(!backend.emit_mouse(&MouseEvent::button(
            Point::new(1, 1),
            MouseButton::Right,
            true
        )));

        backend.unhook(block).unwrap();
        backend.unhook(allow).unwrap();
        assert_eq!(backend.hook_count(), 0);
    }

    #[test]
    fn test_window_mutations_update_snapshots() {
        let backend = MemoryBackend::new();
        backend.add_window(WindowInfo::new(WindowHandle(7), "Editor", Rect::new(0, 0, 800, 600)));

        backend.move_window(WindowHandle(7), 2000, 100).unwrap();
        backend.focus_window(WindowHandle(7)).unwrap();

        let active = backend.active_window().unwrap().unwrap();
        assert_eq!(active.rect, Rect::new(2000, 100, 800, 600));
        assert!(active.is_active);
        assert_eq!(active.display.map(|d| d.id), Some("display1".to_string()));

        let err = backend.resize_window(WindowHandle(99), 1, 1).unwrap_err();
        assert!(matches!(err, AutomationError::WindowNotFound(_)));
    }
}
