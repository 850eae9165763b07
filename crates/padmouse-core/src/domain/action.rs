//! Action table: which keys become mouse actions, and their latch.
//!
//! The table is built once at startup and never gains or loses entries.  The
//! only thing that changes afterwards is each binding's `active` flag, the
//! *latch*: it is written when the key is pressed (to the touch state at that
//! instant) and cleared when the key is released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::codes::{
    BTN_LEFT, BTN_MIDDLE, BTN_RIGHT, KEY_COMMA, KEY_I, KEY_J, KEY_K, KEY_L,
};

/// Error type for action table construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionTableError {
    #[error("key code {0} is bound more than once")]
    DuplicateKey(u16),
}

/// A button on the virtual mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// The `BTN_*` code emitted on the virtual mouse.
    pub fn code(self) -> u16 {
        match self {
            MouseButton::Left => BTN_LEFT,
            MouseButton::Middle => BTN_MIDDLE,
            MouseButton::Right => BTN_RIGHT,
        }
    }
}

/// What a bound key does while its latch is set.
///
/// In TOML this is written as `{ button = "left" }` or `{ scroll = -1 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Press/release the given mouse button in step with the key.
    #[serde(rename = "button")]
    MouseButton(MouseButton),
    /// Emit `REL_WHEEL` ticks of this signed delta while the key is held.
    /// Positive scrolls up, negative scrolls down.
    Scroll(i32),
}

/// One key's binding plus its latch.
#[derive(Debug)]
pub struct ActionBinding {
    source_code: u16,
    action: Action,
    active: AtomicBool,
}

impl ActionBinding {
    pub fn new(source_code: u16, action: Action) -> Self {
        Self {
            source_code,
            action,
            active: AtomicBool::new(false),
        }
    }

    pub fn source_code(&self) -> u16 {
        self.source_code
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Captures the touch state at the moment the key goes down.
    pub fn latch(&self, touching: bool) {
        self.active.store(touching, Ordering::Relaxed);
    }

    /// Current latch value.  Fixed from press until release.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Clears the latch once the release has been dispatched.
    pub fn release(&self) {
        self.active.store(false, Ordering::Relaxed);
    }
}

/// The fixed set of bindings, keyed by source key code.
#[derive(Debug)]
pub struct ActionTable {
    bindings: HashMap<u16, ActionBinding>,
}

impl ActionTable {
    /// Builds a table from `(key code, action)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ActionTableError::DuplicateKey`] if a key code appears twice.
    pub fn new<I>(entries: I) -> Result<Self, ActionTableError>
    where
        I: IntoIterator<Item = (u16, Action)>,
    {
        let mut bindings = HashMap::new();
        for (code, action) in entries {
            if bindings.contains_key(&code) {
                return Err(ActionTableError::DuplicateKey(code));
            }
            bindings.insert(code, ActionBinding::new(code, action));
        }
        Ok(Self { bindings })
    }

    /// The stock layout: J/K/L are left/middle/right, I scrolls up and comma
    /// scrolls down.
    pub fn with_defaults() -> Self {
        let bindings = Self::default_entries()
            .into_iter()
            .map(|(code, action)| (code, ActionBinding::new(code, action)))
            .collect();
        Self { bindings }
    }

    /// The `(key code, action)` pairs behind [`ActionTable::with_defaults`].
    pub fn default_entries() -> Vec<(u16, Action)> {
        vec![
            (KEY_J, Action::MouseButton(MouseButton::Left)),
            (KEY_K, Action::MouseButton(MouseButton::Middle)),
            (KEY_L, Action::MouseButton(MouseButton::Right)),
            (KEY_I, Action::Scroll(1)),
            (KEY_COMMA, Action::Scroll(-1)),
        ]
    }

    pub fn get(&self, code: u16) -> Option<&ActionBinding> {
        self.bindings.get(&code)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates bindings in ascending key-code order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionBinding> {
        let mut bindings: Vec<&ActionBinding> = self.bindings.values().collect();
        bindings.sort_by_key(|b| b.source_code);
        bindings.into_iter()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
