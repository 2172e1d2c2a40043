//! Text clipboard

use std::sync::Arc;

use super::platform::Backend;
use crate::error::Result;

pub struct Clipboard {
    backend: Arc<dyn Backend>,
}

impl Clipboard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn get_text(&self) -> Result<String> {
        self.backend.clipboard_get_text()
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        self.backend.clipboard_set_text(text)
    }

    /// Same observable effect as `set_text("")`
    pub fn clear(&self) -> Result<()> {
        self.backend.clipboard_clear()
    }

    pub fn has_text(&self) -> Result<bool> {
        self.backend.clipboard_has_text()
    }
}
