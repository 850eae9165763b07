//! Storage infrastructure: the read-only configuration file.

pub mod config;
