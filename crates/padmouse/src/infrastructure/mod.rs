//! Infrastructure layer for the padmouse daemon.
//!
//! Contains OS-facing adapters: evdev input streams, uinput virtual devices,
//! device discovery, the TOML config file, and the grab/shutdown guard.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `padmouse_core`, but MUST NOT be imported by the `application` or domain
//! layers outside of tests.
//!
//! # Sub-modules
//!
//! - **`devices`** – evdev/uinput implementations of the device traits
//!   (Linux only) plus in-memory mocks for tests.
//! - **`discovery`** – Finds the keyboard, the touchpad, and any real mouse by
//!   device name.
//! - **`storage`** – Read-only TOML configuration.
//! - **`shutdown`** – Signal handling and the idempotent keyboard release.

pub mod devices;
pub mod discovery;
pub mod shutdown;
pub mod storage;
