//! Desktop automation module
//!
//! Programmatic control of mouse, keyboard, displays, windows and the text
//! clipboard through a single platform capability trait.
//!
//! ## Architecture
//!
//! - `Desktop` - Context object owning one backend and every facade
//! - `Mouse` / `Keyboard` / `Display` / `Window` / `Clipboard` / `Events` - Facades
//! - `Backend` - Platform abstraction; `MemoryBackend` is always available,
//!   `NativeBackend` needs the `native` feature
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use deskauto::desktop::{Desktop, Key, MemoryBackend, MouseButton};
//!
//! let desktop = Desktop::new(Arc::new(MemoryBackend::new()));
//!
//! desktop.mouse().move_to(400, 300, Duration::from_millis(200), None)?;
//! desktop.mouse().click(MouseButton::Left, 1, Duration::ZERO)?;
//! desktop.keyboard().write("Hello", Duration::ZERO)?;
//! desktop.keyboard().hotkey(&[Key::Control, Key::Char('s')], Duration::ZERO)?;
//! # Ok::<(), deskauto::AutomationError>(())
//! ```

pub mod clipboard;
pub mod display;
pub mod events;
pub mod input;
pub mod keyboard;
pub mod manager;
pub mod mouse;
pub mod platform;
pub mod types;
pub mod window;

// Re-export main types
pub use clipboard::Clipboard;
pub use display::Display;
pub use events::Events;
pub use input::{parse_combo, Key, MouseButton};
pub use keyboard::Keyboard;
pub use manager::Desktop;
pub use mouse::{easing, Easing, Mouse};
pub use platform::{create_backend, Backend, BackendCall, MemoryBackend};
pub use types::{
    DisplayInfo, HookHandle, HookKind, KeyboardEvent, MouseEvent, Point, Rect, Size,
    WindowHandle, WindowInfo, WindowState,
};
pub use window::{Window, WindowQuery, WindowTarget};

#[cfg(feature = "native")]
pub use platform::NativeBackend;
