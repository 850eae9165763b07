//! The keyboard remap state machine.
//!
//! [`decide`] classifies one event read from the grabbed keyboard.  It is the
//! only place that writes a binding's latch, so the whole latch rule lives in
//! this file:
//!
//! 1. Non-key events are forwarded.
//! 2. Keys without a binding are forwarded.
//! 3. On press, the binding latches the current touch state.
//! 4. A key whose latch is clear is forwarded, autorepeat included.
//! 5. A key whose latch is set is suppressed and turned into its action.
//!    Its autorepeat is dropped.  On release the latch is cleared after the
//!    action is decided.
//!
//! The touch state is read on press only.  A key pressed without touch stays
//! an ordinary key until it is released, even if a finger lands meanwhile.

use tracing::trace;

use super::action::{Action, ActionTable, MouseButton};
use super::activation::ActivationState;
use crate::input::{InputEvent, KeyState};

/// Outcome of [`decide`] for one keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the event unchanged to the passthrough device.
    Forward(InputEvent),
    /// Press (`pressed == true`) or release the given virtual mouse button.
    MouseButton { button: MouseButton, pressed: bool },
    /// Emit one wheel tick now and start the repeating scroll task for `code`.
    ScrollStart { code: u16, delta: i32 },
    /// Cancel the repeating scroll task for `code`.
    ScrollStop { code: u16 },
    /// Drop the event.  Autorepeat of a latched key.
    Suppress,
}

/// Decides what to do with one event from the grabbed keyboard.
///
/// Reads `activation` only when a bound key is pressed, and updates that
/// binding's latch as a side effect.
pub fn decide(table: &ActionTable, activation: &ActivationState, event: &InputEvent) -> Decision {
    let Some(state) = event.key_state() else {
        return Decision::Forward(*event);
    };

    let Some(binding) = table.get(event.code) else {
        return Decision::Forward(*event);
    };

    if state == KeyState::Repeat {
        return if binding.is_active() {
            Decision::Suppress
        } else {
            Decision::Forward(*event)
        };
    }

    if state == KeyState::Press {
        binding.latch(activation.is_touching());
    }

    if !binding.is_active() {
        trace!(code = event.code, ?state, "bound key not latched; forwarding");
        return Decision::Forward(*event);
    }

    let decision = match (binding.action(), state) {
        (Action::MouseButton(button), state) => Decision::MouseButton {
            button,
            pressed: state == KeyState::Press,
        },
        (Action::Scroll(delta), KeyState::Press) => Decision::ScrollStart {
            code: event.code,
            delta,
        },
        (Action::Scroll(_), _) => Decision::ScrollStop { code: event.code },
    };

    if state == KeyState::Release {
        binding.release();
    }

    decision
}

// ── Tests ─────────────────────────────────────────────────────────────────────
