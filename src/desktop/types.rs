use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::input::{Key, MouseButton};

/// A screen coordinate in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Saturates at the `i32` bounds.
impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x.saturating_add(other.x), self.y.saturating_add(other.y))
    }
}

/// Saturates at the `i32` bounds.
impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle. Width and height are assumed non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center point; odd dimensions are floor-divided before adding to the origin.
    pub fn center(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width.div_euclid(2)),
            self.y.saturating_add(self.height.div_euclid(2)),
        )
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, point: Point) -> bool {
        self.left() <= point.x
            && point.x <= self.right()
            && self.top() <= point.y
            && point.y <= self.bottom()
    }

    /// Minimal rectangle enclosing every input; the zero rect when empty.
    pub fn enclosing<I>(rects: I) -> Rect
    where
        I: IntoIterator<Item = Rect>,
    {
        let mut iter = rects.into_iter();
        let Some(first) = iter.next() else {
            return Rect::default();
        };

        let (mut min_x, mut min_y) = (first.left(), first.top());
        let (mut max_x, mut max_y) = (first.right(), first.bottom());
        for r in iter {
            min_x = min_x.min(r.left());
            min_y = min_y.min(r.top());
            max_x = max_x.max(r.right());
            max_y = max_y.max(r.bottom());
        }

        Rect::new(
            min_x,
            min_y,
            max_x.saturating_sub(min_x),
            max_y.saturating_sub(min_y),
        )
    }
}

/// One physical display as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub id: String,
    pub name: String,
    /// Logical bounds in virtual-screen coordinates
    pub bounds: Rect,
    /// Usable area excluding task bars and docks; always inside `bounds`
    pub work_area: Rect,
    /// Device pixel ratio
    pub scale: f64,
    pub physical_size: Size,
    pub refresh_rate: f64,
    /// Degrees: 0, 90, 180 or 270
    pub rotation: u16,
    pub is_primary: bool,
}

impl DisplayInfo {
    /// Bounds measured in device pixels, anchored at the logical origin.
    pub fn physical_bounds(&self) -> Rect {
        Rect::new(
            self.bounds.x,
            self.bounds.y,
            (self.bounds.width as f64 * self.scale) as i32,
            (self.bounds.height as f64 * self.scale) as i32,
        )
    }
}

/// Opaque platform window handle (HWND, CGWindowID, X11 window id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
}

/// Snapshot of a top-level window. Built fresh on every query; compare by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
    pub pid: u32,
    pub process_name: String,
    /// Screen-space frame
    pub rect: Rect,
    pub client_rect: Rect,
    pub state: WindowState,
    pub is_visible: bool,
    pub is_active: bool,
    pub is_always_on_top: bool,
    pub opacity: f64,
    pub display: Option<DisplayInfo>,
}

impl WindowInfo {
    /// A visible, normal-state window with the given handle, title and frame.
    pub fn new(handle: WindowHandle, title: impl Into<String>, rect: Rect) -> Self {
        Self {
            handle,
            title: title.into(),
            class_name: String::new(),
            pid: 0,
            process_name: String::new(),
            rect,
            client_rect: rect,
            state: WindowState::Normal,
            is_visible: true,
            is_active: false,
            is_always_on_top: false,
            opacity: 1.0,
            display: None,
        }
    }

    pub fn display_name(&self) -> String {
        if self.title.is_empty() {
            self.process_name.clone()
        } else if self.process_name.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.process_name)
        }
    }
}

/// Identifies an installed event hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    Mouse,
    Keyboard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    pub position: Point,
    /// `None` for plain motion
    pub button: Option<MouseButton>,
    pub pressed: bool,
    pub timestamp: DateTime<Utc>,
}

impl MouseEvent {
    pub fn motion(position: Point) -> Self {
        Self {
            position,
            button: None,
            pressed: false,
            timestamp: Utc::now(),
        }
    }

    pub fn button(position: Point, button: MouseButton, pressed: bool) -> Self {
        Self {
            position,
            button: Some(button),
            pressed,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub key: Key,
    pub pressed: bool,
    pub modifiers: Vec<Key>,
    pub timestamp: DateTime<Utc>,
}

impl KeyboardEvent {
    pub fn new(key: Key, pressed: bool, modifiers: Vec<Key>) -> Self {
        Self {
            key,
            pressed,
            modifiers,
            timestamp: Utc::now(),
        }
    }
}

/// Hook callbacks run on the OS event thread; the return value decides propagation.
pub type MouseCallback = Box<dyn Fn(&MouseEvent) -> bool + Send + Sync>;
pub type KeyboardCallback = Box<dyn Fn(&KeyboardEvent) -> bool + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let samples = [
            (Point::new(3, 4), Point::new(-7, 11)),
            (Point::new(0, 0), Point::new(1920, 1080)),
            (Point::new(-5, -5), Point::new(-5, 5)),
        ];
        for (p, q) in samples {
            assert_eq!((p + q) - q, p);
            assert_eq!(p + q, q + p);
        }
    }

    #[test]
    fn test_point_arithmetic_saturates() {
        let far = Point::new(i32::MAX - 1, i32::MIN + 1);
        assert_eq!(far + Point::new(10, -10), Point::new(i32::MAX, i32::MIN));
        assert_eq!(far - Point::new(-10, 10), Point::new(i32::MAX, i32::MIN));
        assert_eq!(Point::new(i32::MIN, 0) - Point::new(1, 0), Point::new(i32::MIN, 0));
    }

    #[test]
    fn test_rect_edges_saturate() {
        let r = Rect::new(i32::MAX - 5, 0, 100, 100);
        assert_eq!(r.right(), i32::MAX);
        assert!(r.contains(Point::new(i32::MAX, 50)));
        assert_eq!(r.center().x, i32::MAX);
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.left(), 10);
        assert_eq!(r.top(), 20);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert_eq!(r.size(), Size::new(100, 50));
    }

    #[test]
    fn test_rect_center() {
        assert_eq!(Rect::new(10, 20, 100, 50).center(), Point::new(60, 45));
        assert_eq!(Rect::new(0, 0, 101, 51).center(), Point::new(50, 25));
    }

    #[test]
    fn test_rect_contains_inclusive_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert!(r.contains(Point::new(50, 40)));
        assert!(r.contains(Point::new(10, 40)));
        assert!(r.contains(Point::new(110, 40)));
        assert!(r.contains(Point::new(50, 20)));
        assert!(r.contains(Point::new(50, 70)));
        assert!(!r.contains(Point::new(9, 40)));
        assert!(!r.contains(Point::new(111, 40)));
        assert!(!r.contains(Point::new(50, 71)));
    }

    #[test]
    fn test_rect_enclosing() {
        let rects = [Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)];
        assert_eq!(Rect::enclosing(rects), Rect::new(0, 0, 3840, 1080));

        let stacked = [Rect::new(0, 0, 100, 100), Rect::new(-50, 200, 10, 10)];
        assert_eq!(Rect::enclosing(stacked), Rect::new(-50, 0, 150, 210));

        assert_eq!(Rect::enclosing(Vec::new()), Rect::default());
    }

    #[test]
    fn test_physical_bounds_truncate() {
        let display = DisplayInfo {
            id: "d".into(),
            name: "d".into(),
            bounds: Rect::new(100, 0, 1001, 501),
            work_area: Rect::new(100, 0, 1001, 501),
            scale: 1.5,
            physical_size: Size::new(1501, 751),
            refresh_rate: 60.0,
            rotation: 0,
            is_primary: true,
        };
        assert_eq!(display.physical_bounds(), Rect::new(100, 0, 1501, 751));
    }

    #[test]
    fn test_window_display_name() {
        let mut win = WindowInfo::new(WindowHandle(1), "Notes", Rect::new(0, 0, 10, 10));
        assert_eq!(win.display_name(), "Notes");
        win.process_name = "notes.exe".into();
        assert_eq!(win.display_name(), "Notes - notes.exe");
        win.title.clear();
        assert_eq!(win.display_name(), "notes.exe");
    }
}
