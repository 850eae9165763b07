//! Application layer of the padmouse daemon.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The application layer wires the pure rules from `padmouse_core` to device
//! *abstractions*.  It never opens a file under `/dev/input` itself; it only
//! sees the [`devices::EventSource`] and [`devices::EventSink`] traits, which
//! the infrastructure layer implements with evdev/uinput and the tests
//! implement with in-memory mocks.
//!
//! # Sub-modules
//!
//! - **`devices`** – Device traits and the shared [`devices::DeviceError`].
//! - **`session`** – The one object that owns the shared state: activation
//!   flag, action table, mouse device, scroll tasks.
//! - **`scroll_tasks`** – Starts and cancels the repeating wheel emitter for
//!   each held scroll key.
//! - **`remap_keys`** – The keyboard monitor.  Runs on every keystroke.
//! - **`track_touch`** – The touchpad monitor.  The only writer of the
//!   activation flag.

pub mod devices;
pub mod remap_keys;
pub mod scroll_tasks;
pub mod session;
pub mod track_touch;
