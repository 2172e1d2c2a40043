//! Global input hooks

use dashmap::DashMap;
use std::sync::Arc;

use super::platform::Backend;
use super::types::{HookHandle, HookKind, KeyboardEvent, MouseEvent};
use crate::error::Result;

/// Installs backend hooks and remembers them so they can be removed from any
/// thread. Callbacks run on the OS delivery thread and return whether the
/// event should propagate.
pub struct Events {
    backend: Arc<dyn Backend>,
    hooks: DashMap<HookHandle, HookKind>,
}

impl Events {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            hooks: DashMap::new(),
        }
    }

    pub fn on_mouse(
        &self,
        callback: impl Fn(&MouseEvent) -> bool + Send + Sync + 'static,
    ) -> Result<HookHandle> {
        let handle = self.backend.hook_mouse(Box::new(callback))?;
        tracing::debug!("Installed mouse hook {:?}", handle);
        self.hooks.insert(handle, HookKind::Mouse);
        Ok(handle)
    }

    pub fn on_keyboard(
        &self,
        callback: impl Fn(&KeyboardEvent) -> bool + Send + Sync + 'static,
    ) -> Result<HookHandle> {
        let handle = self.backend.hook_keyboard(Box::new(callback))?;
        tracing::debug!("Installed keyboard hook {:?}", handle);
        self.hooks.insert(handle, HookKind::Keyboard);
        Ok(handle)
    }

    /// Remove one hook. Handles this facade did not install are ignored; a
    /// hook the backend failed to remove stays tracked so it can be retried.
    pub fn unhook(&self, handle: HookHandle) -> Result<()> {
        if !self.hooks.contains_key(&handle) {
            return Ok(());
        }
        self.backend.unhook(handle)?;
        self.hooks.remove(&handle);
        tracing::debug!("Removed hook {:?}", handle);
        Ok(())
    }

    pub fn unhook_all(&self) -> Result<()> {
        let handles: Vec<HookHandle> = self.hooks.iter().map(|entry| *entry.key()).collect();
        for handle in handles {
            self.unhook(handle)?;
        }
        Ok(())
    }

    pub fn active_hooks(&self) -> Vec<(HookHandle, HookKind)> {
        let mut hooks: Vec<(HookHandle, HookKind)> = self
            .hooks
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        hooks.sort_by_key(|(handle, _)| handle.0);
        hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::input::{Key, MouseButton};
    use crate::desktop::platform::MemoryBackend;
    use crate::desktop::types::Point;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixture() -> (Arc<MemoryBackend>, Events) {
        let backend = Arc::new(MemoryBackend::new());
        (backend.clone(), Events::new(backend))
    }

    #[test]
    fn test_hooks_receive_events() {
        let (backend, events) = fixture();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        events
            .on_keyboard(move |e| {
                counter.fetch_add(1, Ordering::SeqCst);
                e.key != Key::Escape
            })
            .unwrap();

        assert!(backend.emit_keyboard(&KeyboardEvent::new(Key::Char('a'), true, vec![])));
        assert!(!backend.emit_keyboard(&KeyboardEvent::new(Key::Escape, true, vec![])));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unhook_all_and_unknown() {
        let (backend, events) = fixture();
        let mouse = events.on_mouse(|_| true).unwrap();
        let keyboard = events.on_keyboard(|_| true).unwrap();
        assert_eq!(
            events.active_hooks(),
            vec![(mouse, HookKind::Mouse), (keyboard, HookKind::Keyboard)]
        );

        events.unhook(HookHandle(999)).unwrap();
        assert_eq!(backend.hook_count(), 2);

        events.unhook_all().unwrap();
        assert!(events.active_hooks().is_empty());
        assert_eq!(backend.hook_count(), 0);
        assert!(backend.emit_mouse(&MouseEvent::button(
            Point::new(0, 0),
            MouseButton::Left,
            true
        )));
    }

    #[test]
    fn test_failed_unhook_can_be_retried() {
        let (backend, events) = fixture();
        let handle = events.on_mouse(|_| true).unwrap();

        backend.fail("unhook");
        assert!(events.unhook(handle).is_err());
        assert_eq!(events.active_hooks(), vec![(handle, HookKind::Mouse)]);

        backend.clear_faults();
        events.unhook_all().unwrap();
        assert!(events.active_hooks().is_empty());
        assert_eq!(backend.hook_count(), 0);
    }

    #[test]
    fn test_unsupported_hooks_are_not_tracked() {
        let (backend, events) = fixture();
        backend.unsupported("hook_mouse");
        let err = events.on_mouse(|_| true).unwrap_err();
        assert!(err.is_unsupported());
        assert!(events.active_hooks().is_empty());
    }
}
