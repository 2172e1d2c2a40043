//! Cross-platform desktop automation with a composable macro engine
//!
//! - [`desktop`] - mouse, keyboard, display, window, clipboard and event-hook
//!   facades over a pluggable [`Backend`](desktop::Backend)
//! - [`macros`] - declarative action trees with cooperative stop semantics
//! - [`config`] - backend selection and input timings from the environment

pub mod config;
pub mod desktop;
pub mod error;
pub mod macros;

pub use config::{BackendKind, Config, Timings};
pub use desktop::Desktop;
pub use error::{AutomationError, Result};
pub use macros::{Action, Macro, MacroContext, StopHandle};
