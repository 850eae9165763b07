//! Device discovery by display name.
//!
//! Devices are matched by a case-insensitive substring of the name the kernel
//! reports (`EVIOCGNAME`), e.g. `"touchpad"` matches
//! `"SYNA8004:00 06CB:CD8B Touchpad"`.  The matching helpers work on a plain
//! list of [`DeviceInfo`] so they can be tested without `/dev/input`.
//!
//! # Companion nodes
//!
//! One physical I2C-HID or PS/2 device often shows up as several nodes that
//! share a name prefix, e.g. `"SYNA8004:00 06CB:CD8B Touchpad"` and
//! `"SYNA8004:00 06CB:CD8B Mouse"`.  That prefix (the name minus its last
//! word) is the device's *family*.  [`find_pointing_device`] excludes the
//! touchpad's whole family, so its `Mouse` node is never taken for a real
//! mouse.  Keyboards get no such treatment: a keyboard/mouse combo receiver
//! carries a real mouse in the same family.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for device discovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("no input device name contains {needle:?}")]
    NotFound { needle: String },
}

/// An enumerated input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
}

impl DeviceInfo {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    fn name_contains(&self, needle: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    /// The name minus its last word, or `None` for one-word names.
    pub fn family(&self) -> Option<&str> {
        let (family, _) = self.name.trim().rsplit_once(char::is_whitespace)?;
        let family = family.trim_end();
        (!family.is_empty()).then_some(family)
    }

    fn in_family(&self, family: &str) -> bool {
        self.family()
            .is_some_and(|own| own.eq_ignore_ascii_case(family))
    }
}

/// Enumerates `/dev/input/event*`, ordered by event number.
#[cfg(target_os = "linux")]
pub fn discover_devices() -> Vec<DeviceInfo> {
    let mut devices: Vec<DeviceInfo> = evdev::enumerate()
        .map(|(path, device)| DeviceInfo {
            name: device.name().unwrap_or_default().to_string(),
            path,
        })
        .collect();
    sort_by_event_number(&mut devices);
    devices
}

/// Orders `eventN` paths numerically so `event2` precedes `event10`.
pub fn sort_by_event_number(devices: &mut [DeviceInfo]) {
    devices.sort_by_key(|d| (event_number(&d.path), d.path.clone()));
}

fn event_number(path: &Path) -> u32 {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix("event"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}

/// Returns the first device whose name contains `needle`.
///
/// # Errors
///
/// Returns [`DiscoveryError::NotFound`] if nothing matches.
pub fn find_device<'a>(
    devices: &'a [DeviceInfo],
    needle: &str,
) -> Result<&'a DeviceInfo, DiscoveryError> {
    devices
        .iter()
        .find(|d| d.name_contains(needle))
        .ok_or_else(|| DiscoveryError::NotFound {
            needle: needle.to_string(),
        })
}

/// Returns a dedicated pointing device, if one is attached.
///
/// A device qualifies when its name contains `mouse_needle`, it matches none
/// of `exclude`, and it is not in the family of a device matching
/// `touchpad_needle`.
pub fn find_pointing_device<'a>(
    devices: &'a [DeviceInfo],
    mouse_needle: &str,
    exclude: &[&str],
    touchpad_needle: &str,
) -> Option<&'a DeviceInfo> {
    let touchpad_families: Vec<&str> = devices
        .iter()
        .filter(|d| d.name_contains(touchpad_needle))
        .filter_map(DeviceInfo::family)
        .collect();

    devices
        .iter()
        .filter(|d| !exclude.iter().any(|needle| d.name_contains(needle)))
        .filter(|d| !touchpad_families.iter().any(|family| d.in_family(family)))
        .find(|d| d.name_contains(mouse_needle))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
