//! TOML configuration for the padmouse daemon.
//!
//! The file is read once at startup and never written.  Its location is:
//!
//! 1. `$PADMOUSE_CONFIG`, if set;
//! 2. `$XDG_CONFIG_HOME/padmouse/config.toml`;
//! 3. `~/.config/padmouse/config.toml`.
//!
//! A missing file is not an error: every field has a default, so the daemon
//! runs with the stock bindings out of the box.
//!
//! ```toml
//! [daemon]
//! log_level = "info"
//!
//! [devices]
//! keyboard_name = "keyboard"
//! touchpad_name = "touchpad"
//! mouse_name = "mouse"
//! exit_if_mouse_present = true
//! mouse_exclude = []
//!
//! [touch]
//! size_axis = "ABS_MT_TOUCH_MAJOR"
//! # size_threshold = 1000
//!
//! [scroll]
//! initial_delay_ms = 500
//! repeat_interval_ms = 50
//!
//! [[bindings]]
//! key = "KEY_J"
//! action = { button = "left" }
//!
//! [[bindings]]
//! key = "KEY_I"
//! action = { scroll = 1 }
//! ```
//!
//! Supplying any `[[bindings]]` replaces the whole default table.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use padmouse_core::input::codes::{
    ABS_MT_PRESSURE, ABS_MT_TOUCH_MAJOR, ABS_PRESSURE, ABS_TOOL_WIDTH,
};
use padmouse_core::{Action, ActionTable, ActionTableError, TouchClassifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::scroll_tasks::ScrollTiming;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "PADMOUSE_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine config directory (neither XDG_CONFIG_HOME nor HOME is set)")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown key name {0:?} in bindings")]
    UnknownKey(String),

    #[error("unknown touch size axis {0:?}")]
    UnknownAxis(String),

    #[error("invalid bindings: {0}")]
    Bindings(#[from] ActionTableError),

    #[error("scroll repeat interval must be greater than zero")]
    ZeroRepeatInterval,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub devices: DeviceConfig,
    #[serde(default)]
    pub touch: TouchConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    /// Empty means "use the default bindings".
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Name fragments used to pick devices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    #[serde(default = "default_keyboard_name")]
    pub keyboard_name: String,
    #[serde(default = "default_touchpad_name")]
    pub touchpad_name: String,
    #[serde(default = "default_mouse_name")]
    pub mouse_name: String,
    /// Exit at startup when a real mouse is attached.
    #[serde(default = "default_true")]
    pub exit_if_mouse_present: bool,
    /// Extra name fragments that never count as a real mouse.  The
    /// touchpad's companion `Mouse` node is excluded without listing it here.
    #[serde(default)]
    pub mouse_exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouchConfig {
    /// Contact-size axis used by the palm filter.
    #[serde(default = "default_size_axis")]
    pub size_axis: String,
    /// Contacts at or above this size never activate remapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_threshold: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrollConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_repeat_interval_ms")]
    pub repeat_interval_ms: u64,
}

/// One `[[bindings]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindingEntry {
    /// Kernel key name (`"KEY_J"`) or a raw numeric code (`"36"`).
    pub key: String,
    pub action: Action,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_keyboard_name() -> String {
    "keyboard".to_string()
}
fn default_touchpad_name() -> String {
    "touchpad".to_string()
}
fn default_mouse_name() -> String {
    "mouse".to_string()
}
fn default_true() -> bool {
    true
}
fn default_size_axis() -> String {
    "ABS_MT_TOUCH_MAJOR".to_string()
}
fn default_initial_delay_ms() -> u64 {
    500
}
fn default_repeat_interval_ms() -> u64 {
    50
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            keyboard_name: default_keyboard_name(),
            touchpad_name: default_touchpad_name(),
            mouse_name: default_mouse_name(),
            exit_if_mouse_present: default_true(),
            mouse_exclude: Vec::new(),
        }
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            size_axis: default_size_axis(),
            size_threshold: None,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            repeat_interval_ms: default_repeat_interval_ms(),
        }
    }
}

// ── Conversions into runtime types ────────────────────────────────────────────

impl AppConfig {
    /// Builds the action table, resolving key names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for an unresolvable key name and
    /// [`ConfigError::Bindings`] if a key is bound twice.
    pub fn build_action_table(&self) -> Result<ActionTable, ConfigError> {
        if self.bindings.is_empty() {
            return Ok(ActionTable::with_defaults());
        }
        let entries = self
            .bindings
            .iter()
            .map(|entry| Ok((resolve_key(&entry.key)?, entry.action)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(ActionTable::new(entries)?)
    }

    /// Builds the touch classifier from `[touch]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAxis`] if `size_axis` is not recognised.
    pub fn touch_classifier(&self) -> Result<TouchClassifier, ConfigError> {
        let axis = resolve_size_axis(&self.touch.size_axis)?;
        Ok(TouchClassifier::new(axis, self.touch.size_threshold))
    }

    /// Scroll cadence from `[scroll]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroRepeatInterval`] if the interval is zero,
    /// which would make a held key spin the wheel without pause.
    pub fn scroll_timing(&self) -> Result<ScrollTiming, ConfigError> {
        if self.scroll.repeat_interval_ms == 0 {
            return Err(ConfigError::ZeroRepeatInterval);
        }
        Ok(ScrollTiming {
            initial_delay: Duration::from_millis(self.scroll.initial_delay_ms),
            repeat_interval: Duration::from_millis(self.scroll.repeat_interval_ms),
        })
    }

    /// Name fragments that exclude a device from counting as a real mouse.
    pub fn mouse_exclusions(&self) -> Vec<&str> {
        let mut exclude = vec![
            self.devices.keyboard_name.as_str(),
            self.devices.touchpad_name.as_str(),
        ];
        exclude.extend(self.devices.mouse_exclude.iter().map(String::as_str));
        exclude
    }
}

fn resolve_key(name: &str) -> Result<u16, ConfigError> {
    if let Ok(code) = name.trim().parse::<u16>() {
        return Ok(code);
    }
    key_code_from_name(name.trim()).ok_or_else(|| ConfigError::UnknownKey(name.to_string()))
}

#[cfg(target_os = "linux")]
fn key_code_from_name(name: &str) -> Option<u16> {
    crate::infrastructure::devices::linux::key_code_from_name(name)
}

#[cfg(not(target_os = "linux"))]
fn key_code_from_name(_name: &str) -> Option<u16> {
    None
}

fn resolve_size_axis(name: &str) -> Result<u16, ConfigError> {
    let name = name.trim();
    if let Ok(code) = name.parse::<u16>() {
        return Ok(code);
    }
    match name.to_ascii_uppercase().as_str() {
        "ABS_MT_TOUCH_MAJOR" => Ok(ABS_MT_TOUCH_MAJOR),
        "ABS_MT_PRESSURE" => Ok(ABS_MT_PRESSURE),
        "ABS_PRESSURE" => Ok(ABS_PRESSURE),
        "ABS_TOOL_WIDTH" => Ok(ABS_TOOL_WIDTH),
        _ => Err(ConfigError::UnknownAxis(name.to_string())),
    }
}

// ── Config file location and loading ──────────────────────────────────────────

/// Resolves the config file path (see module docs for the search order).
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if neither the override nor
/// a home directory is available.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(
        std::env::var_os(CONFIG_PATH_ENV),
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
    .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the configuration from [`config_file_path`].
///
/// With no resolvable location (no override, no `XDG_CONFIG_HOME`, no
/// `HOME`, as under a bare init) the defaults are returned.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_at(config_file_path().ok().as_deref())
}

fn load_config_at(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config_from(path),
        None => Ok(AppConfig::default()),
    }
}

/// Loads the configuration from `path`, returning defaults if it does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// `$PADMOUSE_CONFIG`, else `$XDG_CONFIG_HOME/padmouse/config.toml`, else
/// `$HOME/.config/padmouse/config.toml`.  Empty values count as unset.
fn resolve_config_path(
    override_path: Option<OsString>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<PathBuf> {
    let set = |value: Option<OsString>| value.filter(|v| !v.is_empty()).map(PathBuf::from);
    if let Some(path) = set(override_path) {
        return Some(path);
    }
    let base = set(xdg_config_home).or_else(|| set(home).map(|h| h.join(".config")))?;
    Some(base.join("padmouse").join("config.toml"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
