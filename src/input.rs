//! Key mapping from terminal key codes to game actions, plus hold
//! tracking for terminals that never report key releases.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

/// How long a freshly pressed key stays held while waiting for the first
/// auto-repeat. Covers the usual 250-500 ms initial repeat delay.
pub const FIRST_REPEAT_GRACE: Duration = Duration::from_millis(600);

/// Once a key is auto-repeating, this much silence counts as a release.
pub const REPEAT_GRACE: Duration = Duration::from_millis(150);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePause,
    Move(Direction),
}

/// Map a key to its action, ignoring letter case.
pub fn action_for(code: KeyCode) -> Option<Action> {
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('p') => Some(Action::TogglePause),
        KeyCode::Char('i') | KeyCode::Up => Some(Action::Move(Direction::Up)),
        KeyCode::Char('k') | KeyCode::Down => Some(Action::Move(Direction::Down)),
        KeyCode::Char('j') | KeyCode::Left => Some(Action::Move(Direction::Left)),
        KeyCode::Char('l') | KeyCode::Right => Some(Action::Move(Direction::Right)),
        _ => None,
    }
}

// ── Hold tracking ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeldKey {
    pub last_seen: Instant,
    pub repeating: bool,
}

impl HeldKey {
    pub fn is_expired(&self, now: Instant) -> bool {
        let grace = if self.repeating {
            REPEAT_GRACE
        } else {
            FIRST_REPEAT_GRACE
        };
        now.saturating_duration_since(self.last_seen) > grace
    }
}

/// Turns the raw press/repeat/release stream into one key-down and one
/// key-up per physical hold, independent of the frame rate.
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: HashMap<KeyCode, HeldKey>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or auto-repeat. Returns `true` only for the first
    /// event of a hold, which is the one the game should see.
    pub fn press(&mut self, code: KeyCode, now: Instant) -> bool {
        match self.held.get_mut(&code) {
            Some(key) => {
                key.last_seen = now;
                key.repeating = true;
                false
            }
            None => {
                self.held.insert(
                    code,
                    HeldKey {
                        last_seen: now,
                        repeating: false,
                    },
                );
                true
            }
        }
    }

    /// Returns `true` if the key was held.
    pub fn release(&mut self, code: KeyCode) -> bool {
        self.held.remove(&code).is_some()
    }

    /// Drop every key whose grace period ran out and return them.
    pub fn expire(&mut self, now: Instant) -> Vec<KeyCode> {
        let expired: Vec<KeyCode> = self
            .held
            .iter()
            .filter(|(_, key)| key.is_expired(now))
            .map(|(code, _)| *code)
            .collect();
        for code in &expired {
            self.held.remove(code);
        }
        expired
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains_key(&code)
    }
}
