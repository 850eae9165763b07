//! Input event model shared by every padmouse component.
//!
//! Events are kept in the kernel's own `{type, code, value}` shape so that a
//! forwarded event can be written back out bit-for-bit.

pub mod codes;
pub mod event;

pub use event::{EventKind, InputEvent, KeyState};
