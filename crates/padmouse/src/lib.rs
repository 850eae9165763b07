//! padmouse library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does padmouse do? (for beginners)
//!
//! Laptops without a mouse have a touchpad, but dragging, middle-clicking, and
//! long scrolls are awkward on one.  padmouse lets the keyboard help: while a
//! finger rests on the touchpad, a handful of keys stop typing and instead
//! press mouse buttons or spin the wheel.  Lift the finger and those keys type
//! again.
//!
//! The daemon:
//!
//! 1. Finds the keyboard and touchpad by name, and exits quietly if a real
//!    mouse is plugged in.
//! 2. Grabs the keyboard exclusively, so the desktop stops seeing its raw
//!    events.
//! 3. Creates two virtual devices: a *passthrough* keyboard that re-emits every
//!    event it does not remap, and a small *mouse* with three buttons and a
//!    wheel.
//! 4. Runs the touchpad monitor and the keyboard monitor side by side until a
//!    termination signal arrives, then releases the grab.

/// Application layer: monitors, scroll task manager, and the session.
pub mod application;

/// Infrastructure layer: evdev/uinput adapters, discovery, config, shutdown.
pub mod infrastructure;
