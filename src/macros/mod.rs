//! Macro engine
//!
//! A macro is a tree of [`Action`]s run in order against a [`Desktop`]
//! by a small interpreter. Each run owns a [`MacroContext`] holding user
//! variables and a cooperative stop flag; composites (`Repeat`, `Condition`,
//! `Loop`) check the flag between children so a stop requested by a custom
//! action, or through a [`StopHandle`] from another thread, ends the run at
//! the next check point.
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use deskauto::desktop::{Desktop, Key, MemoryBackend, MouseButton};
//! use deskauto::macros::{Action, Macro};
//!
//! let desktop = Desktop::new(Arc::new(MemoryBackend::new()));
//! let save = Macro::new("save-as")
//!     .hotkey(&[Key::Control, Key::Shift, Key::Char('s')])
//!     .wait_ms(300)
//!     .type_text("report.txt")
//!     .tap(Key::Enter)
//!     .add(Action::repeat(vec![Action::click(MouseButton::Left)], 2));
//!
//! let ctx = save.run(&desktop, HashMap::new())?;
//! assert!(!ctx.is_stopped());
//! # Ok::<(), deskauto::AutomationError>(())
//! ```
//!
//! [`Desktop`]: crate::desktop::Desktop

pub mod action;
pub mod builder;
pub mod context;
pub mod executor;

pub use action::{Action, ConditionFn, CustomFn};
pub use builder::Macro;
pub use context::{MacroContext, StopHandle};
pub use executor::execute;
