//! Window lookup and management

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use super::platform::Backend;
use super::types::{Point, Rect, Size, WindowHandle, WindowInfo, WindowState};
use crate::error::{AutomationError, Result};

/// A window given either as a snapshot or as a bare platform handle
#[derive(Debug, Clone, Copy)]
pub enum WindowTarget<'a> {
    Info(&'a WindowInfo),
    Handle(WindowHandle),
}

impl WindowTarget<'_> {
    pub fn handle(&self) -> WindowHandle {
        match self {
            WindowTarget::Info(info) => info.handle,
            WindowTarget::Handle(handle) => *handle,
        }
    }
}

impl<'a> From<&'a WindowInfo> for WindowTarget<'a> {
    fn from(info: &'a WindowInfo) -> Self {
        WindowTarget::Info(info)
    }
}

impl From<WindowHandle> for WindowTarget<'_> {
    fn from(handle: WindowHandle) -> Self {
        WindowTarget::Handle(handle)
    }
}

type WindowPredicate = Box<dyn Fn(&WindowInfo) -> bool + Send + Sync>;

/// Filters for `Window::find`; every filter that is set must match
pub struct WindowQuery {
    title: Option<String>,
    regex: bool,
    class_name: Option<String>,
    pid: Option<u32>,
    process_name: Option<String>,
    predicate: Option<WindowPredicate>,
    visible_only: bool,
}

impl WindowQuery {
    pub fn new() -> Self {
        Self {
            title: None,
            regex: false,
            class_name: None,
            pid: None,
            process_name: None,
            predicate: None,
            visible_only: true,
        }
    }

    /// Case-insensitive substring match on the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self.regex = false;
        self
    }

    /// Case-sensitive regex search on the title
    pub fn title_regex(mut self, pattern: impl Into<String>) -> Self {
        self.title = Some(pattern.into());
        self.regex = true;
        self
    }

    /// Case-insensitive substring match on the class name
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Case-insensitive exact match on the process name
    pub fn process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    pub fn predicate(mut self, f: impl Fn(&WindowInfo) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Box::new(f));
        self
    }

    /// Include hidden windows (default: visible only)
    pub fn include_hidden(mut self) -> Self {
        self.visible_only = false;
        self
    }

    fn compile(&self) -> Result<CompiledQuery<'_>> {
        let title = match (&self.title, self.regex) {
            (Some(pattern), true) => Some(TitleMatch::Regex(Regex::new(pattern)?)),
            (Some(title), false) if !title.is_empty() => {
                Some(TitleMatch::Substring(title.to_lowercase()))
            }
            _ => None,
        };
        Ok(CompiledQuery {
            query: self,
            title,
            class_name: self
                .class_name
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(str::to_lowercase),
            process_name: self
                .process_name
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(str::to_lowercase),
        })
    }
}

impl Default for WindowQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WindowQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowQuery")
            .field("title", &self.title)
            .field("regex", &self.regex)
            .field("class_name", &self.class_name)
            .field("pid", &self.pid)
            .field("process_name", &self.process_name)
            .field("predicate", &self.predicate.is_some())
            .field("visible_only", &self.visible_only)
            .finish()
    }
}

enum TitleMatch {
    Substring(String),
    Regex(Regex),
}

struct CompiledQuery<'q> {
    query: &'q WindowQuery,
    title: Option<TitleMatch>,
    class_name: Option<String>,
    process_name: Option<String>,
}

impl CompiledQuery<'_> {
    fn matches(&self, win: &WindowInfo) -> bool {
        match &self.title {
            Some(TitleMatch::Regex(re)) if !re.is_match(&win.title) => return false,
            Some(TitleMatch::Substring(s)) if !win.title.to_lowercase().contains(s) => {
                return false
            }
            _ => {}
        }
        if let Some(class_name) = &self.class_name {
            if !win.class_name.to_lowercase().contains(class_name) {
                return false;
            }
        }
        if let Some(pid) = self.query.pid {
            if win.pid != pid {
                return false;
            }
        }
        if let Some(process_name) = &self.process_name {
            if win.process_name.to_lowercase() != *process_name {
                return false;
            }
        }
        if let Some(predicate) = &self.query.predicate {
            if !predicate(win) {
                return false;
            }
        }
        true
    }
}

pub struct Window {
    backend: Arc<dyn Backend>,
}

impl Window {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn list(&self, visible_only: bool) -> Result<Vec<WindowInfo>> {
        self.backend.list_windows(visible_only)
    }

    pub fn active(&self) -> Result<Option<WindowInfo>> {
        self.backend.active_window()
    }

    pub fn at_point(&self, x: i32, y: i32) -> Result<Option<WindowInfo>> {
        self.backend.window_at(x, y)
    }

    /// First window matching every filter in `query`
    pub fn find(&self, query: &WindowQuery) -> Result<Option<WindowInfo>> {
        let compiled = query.compile()?;
        Ok(self
            .list(query.visible_only)?
            .into_iter()
            .find(|w| compiled.matches(w)))
    }

    /// All windows matching every filter in `query`, in backend order
    pub fn find_all(&self, query: &WindowQuery) -> Result<Vec<WindowInfo>> {
        let compiled = query.compile()?;
        Ok(self
            .list(query.visible_only)?
            .into_iter()
            .filter(|w| compiled.matches(w))
            .collect())
    }

    /// Current snapshot of the target, re-listing hidden windows too when
    /// only a handle is known.
    pub fn refresh<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<WindowInfo> {
        let handle = target.into().handle();
        self.list(false)?
            .into_iter()
            .find(|w| w.handle == handle)
            .ok_or_else(|| AutomationError::WindowNotFound(handle.to_string()))
    }

    fn rect_of<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<Rect> {
        match target.into() {
            WindowTarget::Info(info) => Ok(info.rect),
            WindowTarget::Handle(handle) => Ok(self.refresh(handle)?.rect),
        }
    }

    pub fn position<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<Point> {
        Ok(self.rect_of(target)?.origin())
    }

    pub fn size<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<Size> {
        Ok(self.rect_of(target)?.size())
    }

    pub fn focus<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<()> {
        self.backend.focus_window(target.into().handle())
    }

    pub fn close<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<()> {
        self.backend.close_window(target.into().handle())
    }

    pub fn move_to<'a>(&self, target: impl Into<WindowTarget<'a>>, x: i32, y: i32) -> Result<()> {
        self.backend.move_window(target.into().handle(), x, y)
    }

    pub fn resize<'a>(
        &self,
        target: impl Into<WindowTarget<'a>>,
        width: i32,
        height: i32,
    ) -> Result<()> {
        self.backend.resize_window(target.into().handle(), width, height)
    }

    pub fn move_resize<'a>(
        &self,
        target: impl Into<WindowTarget<'a>>,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        let handle = target.into().handle();
        self.backend.move_window(handle, x, y)?;
        self.backend.resize_window(handle, width, height)
    }

    pub fn set_rect<'a>(&self, target: impl Into<WindowTarget<'a>>, rect: Rect) -> Result<()> {
        self.move_resize(target, rect.x, rect.y, rect.width, rect.height)
    }

    pub fn state<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<WindowState> {
        self.backend.window_state(target.into().handle())
    }

    pub fn set_state<'a>(
        &self,
        target: impl Into<WindowTarget<'a>>,
        state: WindowState,
    ) -> Result<()> {
        self.backend.set_window_state(target.into().handle(), state)
    }

    pub fn minimize<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<()> {
        self.set_state(target, WindowState::Minimized)
    }

    pub fn maximize<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<()> {
        self.set_state(target, WindowState::Maximized)
    }

    pub fn restore<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<()> {
        self.set_state(target, WindowState::Normal)
    }

    pub fn fullscreen<'a>(&self, target: impl Into<WindowTarget<'a>>) -> Result<()> {
        self.set_state(target, WindowState::Fullscreen)
    }

    /// Opacity is clamped to `[0, 1]`.
    pub fn set_opacity<'a>(&self, target: impl Into<WindowTarget<'a>>, opacity: f64) -> Result<()> {
        self.backend
            .set_window_opacity(target.into().handle(), opacity.clamp(0.0, 1.0))
    }

    pub fn set_always_on_top<'a>(
        &self,
        target: impl Into<WindowTarget<'a>>,
        enabled: bool,
    ) -> Result<()> {
        self.backend
            .set_window_always_on_top(target.into().handle(), enabled)
    }
}
