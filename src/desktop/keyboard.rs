//! Keyboard facade: taps, hotkeys and text entry

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use unicode_segmentation::UnicodeSegmentation;

use super::input::{parse_combo, Key, MODIFIER_KEYS};
use super::platform::Backend;
use crate::config::Timings;
use crate::error::Result;

pub struct Keyboard {
    backend: Arc<dyn Backend>,
    timings: Timings,
}

impl Keyboard {
    pub fn new(backend: Arc<dyn Backend>, timings: Timings) -> Self {
        Self { backend, timings }
    }

    pub fn press(&self, key: Key) -> Result<()> {
        self.backend.key_press(key)
    }

    pub fn release(&self, key: Key) -> Result<()> {
        self.backend.key_release(key)
    }

    pub fn is_pressed(&self, key: Key) -> Result<bool> {
        self.backend.key_is_pressed(key)
    }

    /// Press and release `times` times, waiting `interval` between taps.
    pub fn tap(&self, key: Key, times: u32, interval: Duration) -> Result<()> {
        for i in 0..times {
            self.press(key)?;
            thread::sleep(self.timings.tap_hold);
            self.release(key)?;
            if i + 1 < times {
                thread::sleep(interval);
            }
        }
        Ok(())
    }

    /// Type `text`.
    ///
    /// With a zero interval the whole string goes to the backend in one
    /// injection. Otherwise each grapheme cluster is injected separately
    /// followed by a sleep of `interval`. The two paths can behave
    /// differently in the target application (IME composition,
    /// autocomplete, key-repeat filters), not only in timing.
    pub fn write(&self, text: &str, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return self.backend.key_type_unicode(text);
        }
        for grapheme in text.graphemes(true) {
            self.backend.key_type_unicode(grapheme)?;
            thread::sleep(interval);
        }
        Ok(())
    }

    /// Press `keys` in order, then release them in reverse order so modifiers
    /// go up last.
    pub fn hotkey(&self, keys: &[Key], interval: Duration) -> Result<()> {
        tracing::debug!("Hotkey {:?}", keys);
        for key in keys {
            self.press(*key)?;
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }

        thread::sleep(self.timings.hotkey_settle);

        for key in keys.iter().rev() {
            self.release(*key)?;
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
        Ok(())
    }

    /// Send a combination such as "Ctrl+Shift+S" or a single key like "Enter".
    pub fn send_keys(&self, combo: &str) -> Result<()> {
        let keys = parse_combo(combo)?;
        self.hotkey(&keys, Duration::from_millis(10))
    }

    pub fn press_and_hold(&self, key: Key, duration: Duration) -> Result<()> {
        self.press(key)?;
        thread::sleep(duration);
        self.release(key)
    }

    /// Currently held modifier keys.
    ///
    /// Best effort: a modifier whose state can't be queried counts as not
    /// pressed.
    pub fn modifiers(&self) -> Vec<Key> {
        MODIFIER_KEYS
            .into_iter()
            .filter(|key| match self.is_pressed(*key) {
                Ok(pressed) => pressed,
                Err(e) => {
                    tracing::debug!("Could not query {} state: {}", key, e);
                    false
                }
            })
            .collect()
    }

    pub fn layout(&self) -> Result<String> {
        self.backend.keyboard_layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::platform::{BackendCall, MemoryBackend};

    fn fixture() -> (Arc<MemoryBackend>, Keyboard) {
        let backend = Arc::new(MemoryBackend::new());
        let keyboard = Keyboard::new(backend.clone(), Timings::default());
        (backend, keyboard)
    }

    #[test]
    fn test_hotkey_releases_in_reverse() {
        let (backend, keyboard) = fixture();
        let a = Key::Control;
        let b = Key::Shift;
        let c = Key::Char('s');
        keyboard.hotkey(&[a, b, c], Duration::ZERO).unwrap();
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::KeyPress(a),
                BackendCall::KeyPress(b),
                BackendCall::KeyPress(c),
                BackendCall::KeyRelease(c),
                BackendCall::KeyRelease(b),
                BackendCall::KeyRelease(a),
            ]
        );
    }

    #[test]
    fn test_send_keys_parses_combo() {
        let (backend, keyboard) = fixture();
        keyboard.send_keys("alt+tab").unwrap();
        assert_eq!(backend.calls()[0], BackendCall::KeyPress(Key::Alt));
        assert_eq!(backend.calls()[3], BackendCall::KeyRelease(Key::Alt));
        assert!(keyboard.send_keys("alt+bogus").is_err());
        assert_eq!(backend.calls().len(), 4);
    }

    #[test]
    fn test_write_whole_string_when_no_interval() {
        let (backend, keyboard) = fixture();
        keyboard.write("hello", Duration::ZERO).unwrap();
        assert_eq!(
            backend.calls(),
            vec![BackendCall::TypeUnicode("hello".to_string())]
        );
    }

    #[test]
    fn test_write_per_grapheme_with_interval() {
        let (backend, keyboard) = fixture();
        // "e" + combining acute accent is one grapheme
        keyboard.write("ae\u{301}!", Duration::from_millis(1)).unwrap();
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::TypeUnicode("a".to_string()),
                BackendCall::TypeUnicode("e\u{301}".to_string()),
                BackendCall::TypeUnicode("!".to_string()),
            ]
        );
        assert_eq!(backend.typed_text(), "ae\u{301}!");
    }

    #[test]
    fn test_tap_repeats() {
        let (backend, keyboard) = fixture();
        keyboard.tap(Key::Enter, 3, Duration::from_millis(1)).unwrap();
        let calls = backend.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[4], BackendCall::KeyPress(Key::Enter));
        assert_eq!(calls[5], BackendCall::KeyRelease(Key::Enter));
    }

    #[test]
    fn test_modifiers_best_effort() {
        let (backend, keyboard) = fixture();
        keyboard.press(Key::Shift).unwrap();
        keyboard.press(Key::Meta).unwrap();
        assert_eq!(keyboard.modifiers(), vec![Key::Shift, Key::Meta]);

        backend.fail("key_is_pressed");
        assert!(keyboard.modifiers().is_empty());
    }

    #[test]
    fn test_layout() {
        let (backend, keyboard) = fixture();
        backend.set_layout("de_DE");
        assert_eq!(keyboard.layout().unwrap(), "de_DE");
    }
}
