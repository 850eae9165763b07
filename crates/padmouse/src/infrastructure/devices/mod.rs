//! Device adapters.
//!
//! The evdev/uinput implementation is compiled on Linux only; the mocks are
//! available everywhere so the application layer can be tested on any host.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;
