//! Linux evdev/uinput device adapters.
//!
//! # evdev and uinput (for beginners)
//!
//! Every input device the kernel knows about appears as a character device
//! `/dev/input/eventN`.  Reading it yields a stream of fixed-size
//! `{time, type, code, value}` records.  An `EVIOCGRAB` ioctl on that file
//! makes the reader the *only* consumer: the X server or Wayland compositor
//! stops seeing the device until the grab is released or the file is closed.
//!
//! `/dev/uinput` goes the other way.  A process declares a device (name and
//! capabilities), and the kernel creates a new `/dev/input/eventN` whose
//! events are whatever that process writes.  To the rest of the system it is
//! indistinguishable from hardware.
//!
//! padmouse uses both:
//!
//! - [`EvdevSource`] reads the keyboard (grabbed) and the touchpad (not
//!   grabbed) through evdev's Tokio event stream.
//! - [`UinputSink`] is either the passthrough keyboard or the three-button
//!   wheel mouse.
//!
//! # Permissions
//!
//! Opening `/dev/input/event*` and `/dev/uinput` normally requires root or
//! membership of the `input` group plus a udev rule for `uinput`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, Device, EventStream, EventType, Key, RelativeAxisType,
};
use padmouse_core::input::codes::{is_button_code, KEY_ESC, KEY_MAX};
use padmouse_core::{EventKind, InputEvent, MouseButton};
use tracing::info;

use crate::application::devices::{DeviceError, EventSink, EventSource, Grab};

/// Name of the virtual keyboard that re-emits unmapped events.
pub const PASSTHROUGH_DEVICE_NAME: &str = "padmouse passthrough";

/// Name of the virtual three-button wheel mouse.
pub const MOUSE_DEVICE_NAME: &str = "padmouse mouse";

// ── Event conversion ──────────────────────────────────────────────────────────

fn from_evdev(event: &evdev::InputEvent) -> InputEvent {
    InputEvent::new(
        EventKind::from_raw(event.event_type().0),
        event.code(),
        event.value(),
    )
}

fn to_evdev(event: &InputEvent) -> evdev::InputEvent {
    evdev::InputEvent::new(EventType(event.kind.to_raw()), event.code, event.value)
}

/// Resolves a kernel key name such as `"KEY_J"` (case-insensitive).
pub fn key_code_from_name(name: &str) -> Option<u16> {
    Key::from_str(&name.to_ascii_uppercase())
        .ok()
        .map(|key| key.code())
}

// ── Physical devices ──────────────────────────────────────────────────────────

/// A physical input device read through evdev's async event stream.
pub struct EvdevSource {
    path: PathBuf,
    stream: EventStream,
}

impl EvdevSource {
    /// Opens `path` and registers it with the Tokio reactor.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Open`] if the device cannot be opened.
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let open_error = |source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        };
        let device = Device::open(path).map_err(open_error)?;
        let stream = device.into_event_stream().map_err(open_error)?;
        Ok(Self {
            path: path.to_path_buf(),
            stream,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.stream.device().name().unwrap_or("unnamed device")
    }

    /// Key codes this device reports.
    pub fn supported_keys(&self) -> Vec<u16> {
        self.stream
            .device()
            .supported_keys()
            .map(|keys| keys.iter().map(|key| key.code()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSource for EvdevSource {
    async fn next_event(&mut self) -> Result<InputEvent, DeviceError> {
        let event = self.stream.next_event().await.map_err(DeviceError::Read)?;
        Ok(from_evdev(&event))
    }
}

impl Grab for EvdevSource {
    fn grab(&mut self) -> Result<(), DeviceError> {
        self.stream
            .device_mut()
            .grab()
            .map_err(|source| DeviceError::Grab {
                path: self.path.clone(),
                source,
            })
    }

    fn ungrab(&mut self) -> Result<(), DeviceError> {
        self.stream
            .device_mut()
            .ungrab()
            .map_err(|source| DeviceError::Ungrab {
                path: self.path.clone(),
                source,
            })
    }
}

// ── Virtual devices ───────────────────────────────────────────────────────────

/// A uinput virtual device.
pub struct UinputSink {
    name: &'static str,
    device: VirtualDevice,
}

impl UinputSink {
    /// Creates the passthrough keyboard.
    ///
    /// It declares every keyboard key `KEY_ESC..=KEY_MAX` outside the button
    /// block, plus whatever the physical keyboard reports in `extra_keys`, so
    /// any key the real keyboard can send can be re-emitted.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Create`] if uinput is unavailable.
    pub fn passthrough(extra_keys: &[u16]) -> Result<Self, DeviceError> {
        let mut keys = AttributeSet::<Key>::new();
        for code in (KEY_ESC..=KEY_MAX).filter(|code| !is_button_code(*code)) {
            keys.insert(Key::new(code));
        }
        for code in extra_keys {
            keys.insert(Key::new(*code));
        }

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(PASSTHROUGH_DEVICE_NAME).with_keys(&keys))
            .and_then(|builder| builder.build())
            .map_err(|source| create_error(PASSTHROUGH_DEVICE_NAME, source))?;

        info!("created virtual device {PASSTHROUGH_DEVICE_NAME:?}");
        Ok(Self {
            name: PASSTHROUGH_DEVICE_NAME,
            device,
        })
    }

    /// Creates the virtual mouse: left/middle/right buttons and
    /// `REL_X`/`REL_Y`/`REL_WHEEL`.  X and Y are declared so desktops classify
    /// the device as a mouse; padmouse never moves the pointer.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Create`] if uinput is unavailable.
    pub fn mouse() -> Result<Self, DeviceError> {
        let mut buttons = AttributeSet::<Key>::new();
        for button in [MouseButton::Left, MouseButton::Middle, MouseButton::Right] {
            buttons.insert(Key::new(button.code()));
        }

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_X);
        axes.insert(RelativeAxisType::REL_Y);
        axes.insert(RelativeAxisType::REL_WHEEL);

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(MOUSE_DEVICE_NAME).with_keys(&buttons))
            .and_then(|builder| builder.with_relative_axes(&axes))
            .and_then(|builder| builder.build())
            .map_err(|source| create_error(MOUSE_DEVICE_NAME, source))?;

        info!("created virtual device {MOUSE_DEVICE_NAME:?}");
        Ok(Self {
            name: MOUSE_DEVICE_NAME,
            device,
        })
    }
}

fn create_error(name: &str, source: std::io::Error) -> DeviceError {
    DeviceError::Create {
        name: name.to_string(),
        source,
    }
}

impl EventSink for UinputSink {
    fn emit(&mut self, event: &InputEvent) -> Result<(), DeviceError> {
        // `VirtualDevice::emit` appends a SYN_REPORT itself.  A forwarded
        // sync event is therefore written as an empty batch.
        let converted = [to_evdev(event)];
        let batch = if event.is_sync() {
            &converted[..0]
        } else {
            &converted[..]
        };
        self.device
            .emit(batch)
            .map_err(|source| DeviceError::Write {
                name: self.name.to_string(),
                source,
            })
    }
}
