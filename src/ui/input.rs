/// Input state tracker.
///
/// Collects everything the terminal reported since the last frame:
///   - fresh key presses (edge-triggered, Release events ignored)
///   - pointer motion, in order, so a fast sweep across the No button
///     still counts as entering it
///   - left clicks
///
/// Mouse events require mouse capture, enabled by the renderer.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};

pub struct InputState {
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    pub raw_events: Vec<KeyEvent>,

    /// Pointer positions (col, row) reported this frame, oldest first.
    pub moves: Vec<(u16, u16)>,

    /// Left-button presses (col, row) this frame.
    pub clicks: Vec<(u16, u16)>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            moves: Vec::with_capacity(16),
            clicks: Vec::with_capacity(2),
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.moves.clear();
        self.clicks.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.record_key(key),
                Ok(Event::Mouse(m)) => match m.kind {
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.moves.push((m.column, m.row));
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        // A click is also the pointer arriving there.
                        self.moves.push((m.column, m.row));
                        self.clicks.push((m.column, m.row));
                    }
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }
    }

    fn record_key(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind != KeyEventKind::Release && !self.fresh_presses.contains(&key.code) {
            self.fresh_presses.push(key.code);
        }
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn release_events_do_not_count_as_presses() {
        let mut input = InputState::new();
        let mut release = press(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        input.record_key(release);
        assert!(!input.was_pressed(KeyCode::Enter));

        input.record_key(press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(input.any_pressed(&[KeyCode::Esc, KeyCode::Enter]));
    }

    #[test]
    fn ctrl_c_needs_the_modifier() {
        let mut input = InputState::new();
        input.record_key(press(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!input.ctrl_c_pressed());
        input.record_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(input.ctrl_c_pressed());
    }
}
