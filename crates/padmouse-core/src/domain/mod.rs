//! Domain layer: pure remapping logic with no OS dependencies.
//!
//! # Sub-modules
//!
//! - **`activation`** – The shared "finger down" flag and the classifier that
//!   derives it from raw touchpad events.
//! - **`action`** – Mouse buttons, action kinds, and the fixed table of
//!   bindings with their per-key latch.
//! - **`remap`** – The keyboard state machine as a single pure function from
//!   one event to one [`remap::Decision`].

pub mod action;
pub mod activation;
pub mod remap;
