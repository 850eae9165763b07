//! The `{type, code, value}` input event record.

use super::codes::{EV_ABS, EV_KEY, EV_REL, EV_SYN};

/// The event type field of an [`InputEvent`].
///
/// Only the types padmouse inspects get their own variant; anything else is
/// carried as [`EventKind::Other`] with its raw type number so it can be
/// forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `EV_SYN` – frame boundaries.
    Synchronization,
    /// `EV_KEY` – digital keys and buttons.
    Key,
    /// `EV_REL` – relative axes (motion, wheel).
    Relative,
    /// `EV_ABS` – absolute axes (touchpad position, contact size).
    Absolute,
    /// Any other raw event type (`EV_MSC`, `EV_LED`, ...).
    Other(u16),
}

impl EventKind {
    /// Converts a raw kernel event type number.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            EV_SYN => EventKind::Synchronization,
            EV_KEY => EventKind::Key,
            EV_REL => EventKind::Relative,
            EV_ABS => EventKind::Absolute,
            other => EventKind::Other(other),
        }
    }

    /// Returns the raw kernel event type number.
    pub fn to_raw(self) -> u16 {
        match self {
            EventKind::Synchronization => EV_SYN,
            EventKind::Key => EV_KEY,
            EventKind::Relative => EV_REL,
            EventKind::Absolute => EV_ABS,
            EventKind::Other(raw) => raw,
        }
    }
}

/// The value of a digital key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Release,
    Press,
    /// Kernel autorepeat while a key is held.  padmouse never remaps these.
    Repeat,
}

impl KeyState {
    /// Maps a raw `EV_KEY` value; `None` for values outside `0..=2`.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Release),
            1 => Some(KeyState::Press),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }

    /// The raw `EV_KEY` value for this state.
    pub fn value(self) -> i32 {
        match self {
            KeyState::Release => 0,
            KeyState::Press => 1,
            KeyState::Repeat => 2,
        }
    }
}

/// One input event as read from, or written to, an event device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Shorthand for an `EV_KEY` event.
    pub fn key(code: u16, value: i32) -> Self {
        Self::new(EventKind::Key, code, value)
    }

    /// Shorthand for an `EV_REL` event.
    pub fn relative(code: u16, value: i32) -> Self {
        Self::new(EventKind::Relative, code, value)
    }

    pub fn is_key(&self) -> bool {
        self.kind == EventKind::Key
    }

    pub fn is_sync(&self) -> bool {
        self.kind == EventKind::Synchronization
    }

    /// Returns the key state if this is an `EV_KEY` event with a known value.
    pub fn key_state(&self) -> Option<KeyState> {
        if self.is_key() {
            KeyState::from_value(self.value)
        } else {
            None
        }
    }
}
