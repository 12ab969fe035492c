use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

/// Smooths over platform differences in key reporting.
///
/// Shift+Tab becomes BackTab everywhere. Release events never reach the app.
/// On Windows repeats are dropped and a held Escape fires once until released.
#[derive(Debug, Default)]
pub struct KeyboardNormalizer {
    escape_held: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(mut key) = evt else {
            return Some(evt);
        };
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        self.accept(key.code, key.kind).then_some(Event::Key(key))
    }

    fn accept(&mut self, code: KeyCode, kind: KeyEventKind) -> bool {
        match kind {
            KeyEventKind::Release => {
                if code == KeyCode::Esc {
                    self.escape_held = false;
                }
                false
            }
            KeyEventKind::Repeat => !cfg!(windows),
            KeyEventKind::Press if cfg!(windows) && code == KeyCode::Esc => {
                !std::mem::replace(&mut self.escape_held, true)
            }
            KeyEventKind::Press => {
                self.escape_held = false;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        let mut key = KeyEvent::new(code, modifiers);
        key.kind = kind;
        Event::Key(key)
    }

    #[test]
    fn shift_tab_becomes_backtab() {
        let mut norm = KeyboardNormalizer::new();
        let out = norm.normalize(key(KeyCode::Tab, KeyModifiers::SHIFT, KeyEventKind::Press));
        match out {
            Some(Event::Key(k)) => {
                assert_eq!(k.code, KeyCode::BackTab);
                assert!(!k.modifiers.contains(KeyModifiers::SHIFT));
            }
            other => panic!("expected key event, got {other:?}"),
        }
    }

    #[test]
    fn releases_are_dropped() {
        let mut norm = KeyboardNormalizer::new();
        let out = norm.normalize(key(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(out.is_none());
    }

    #[test]
    fn escape_press_survives() {
        let mut norm = KeyboardNormalizer::new();
        let out = norm.normalize(key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press));
        assert!(matches!(out, Some(Event::Key(k)) if k.code == KeyCode::Esc));
    }

    #[cfg(windows)]
    #[test]
    fn held_escape_fires_once() {
        let mut norm = KeyboardNormalizer::new();
        let press = || key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press);
        assert!(norm.normalize(press()).is_some());
        assert!(norm.normalize(press()).is_none());
        norm.normalize(key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Release));
        assert!(norm.normalize(press()).is_some());
    }

    #[test]
    fn resize_and_focus_pass_through() {
        let mut norm = KeyboardNormalizer::new();
        assert!(matches!(
            norm.normalize(Event::Resize(10, 20)),
            Some(Event::Resize(10, 20))
        ));
        assert!(matches!(
            norm.normalize(Event::FocusLost),
            Some(Event::FocusLost)
        ));
    }
}
