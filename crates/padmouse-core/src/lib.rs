//! # padmouse-core
//!
//! OS-free foundation of the padmouse remapper: the input event model, the
//! touch activation state, the action table with its per-key latch, and the
//! decision function that turns one keyboard event into one remap outcome.
//!
//! # Architecture overview (for beginners)
//!
//! padmouse lets a laptop keyboard act as the buttons and wheel of a mouse
//! while a finger rests on the touchpad.  Two device monitors run side by
//! side in the daemon crate:
//!
//! - the *touchpad monitor* only ever writes one boolean, "finger down";
//! - the *keyboard monitor* reads that boolean at the instant a mapped key is
//!   pressed, latches it into the key's binding, and either forwards the key
//!   unchanged or turns it into a mouse action.
//!
//! This crate holds everything that can be decided without touching a device:
//!
//! - **`input`** – The `{type, code, value}` event record and the Linux event
//!   code constants used by the default bindings.
//! - **`domain`** – [`ActivationState`], [`TouchClassifier`], the
//!   [`ActionTable`], and the pure [`decide`] function.

pub mod domain;
pub mod input;

pub use domain::action::{Action, ActionBinding, ActionTable, ActionTableError, MouseButton};
pub use domain::activation::{ActivationState, TouchClassifier};
pub use domain::remap::{decide, Decision};
pub use input::event::{EventKind, InputEvent, KeyState};
