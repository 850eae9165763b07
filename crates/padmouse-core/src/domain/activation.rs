//! Touch activation: the single boolean that gates every remap.
//!
//! [`ActivationState`] has exactly one writer (the touchpad monitor) and any
//! number of readers (the keyboard monitor, scroll tasks).  It is an atomic so
//! the readers never block the writer and vice versa.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::input::{codes::BTN_TOUCH, EventKind, InputEvent};

/// "A finger is currently on the touchpad."
#[derive(Debug, Default)]
pub struct ActivationState {
    touching: AtomicBool,
}

impl ActivationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new contact value.  Only the touchpad monitor calls this.
    pub fn set(&self, touching: bool) {
        self.touching.store(touching, Ordering::Relaxed);
    }

    /// Snapshot of the current contact value.
    pub fn is_touching(&self) -> bool {
        self.touching.load(Ordering::Relaxed)
    }
}

/// Derives the effective contact state from a touchpad event stream.
///
/// Contact is "down" when `BTN_TOUCH` is 1 and, if a size threshold is set,
/// the most recent value of the size axis is below it.  A palm or a two-finger
/// blob reports a large contact size and therefore never activates remapping.
#[derive(Debug, Clone)]
pub struct TouchClassifier {
    size_axis: u16,
    size_threshold: Option<i32>,
    touch: bool,
    size: Option<i32>,
    effective: bool,
}

impl TouchClassifier {
    /// Creates a classifier.  `size_threshold = None` disables size filtering.
    pub fn new(size_axis: u16, size_threshold: Option<i32>) -> Self {
        Self {
            size_axis,
            size_threshold,
            touch: false,
            size: None,
            effective: false,
        }
    }

    /// Feeds one touchpad event.
    ///
    /// Returns `Some(new_state)` only when the effective contact state changed;
    /// every other event (pointer motion, sync, unrelated axes) yields `None`.
    pub fn observe(&mut self, event: &InputEvent) -> Option<bool> {
        match event.kind {
            EventKind::Key if event.code == BTN_TOUCH => {
                self.touch = event.value == 1;
                if !self.touch {
                    self.size = None;
                }
            }
            EventKind::Absolute if event.code == self.size_axis && self.size_threshold.is_some() => {
                self.size = Some(event.value);
            }
            _ => return None,
        }

        let effective = self.touch && self.size_ok();
        if effective == self.effective {
            return None;
        }
        self.effective = effective;
        Some(effective)
    }

    fn size_ok(&self) -> bool {
        match (self.size_threshold, self.size) {
            (Some(threshold), Some(size)) => size < threshold,
            // No threshold, or no size reported yet for this contact.
            _ => true,
        }
    }
}
