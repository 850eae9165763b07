//! Device abstractions used by the monitors.
//!
//! The infrastructure layer implements these traits with evdev read streams
//! and uinput virtual devices; tests use the mocks in
//! `infrastructure::devices::mock`.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use padmouse_core::InputEvent;
use thiserror::Error;

/// Error type for device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to grab input device {path}: {source}")]
    Grab {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to release grab on input device {path}: {source}")]
    Ungrab {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read from input device: {0}")]
    Read(#[source] io::Error),
    #[error("failed to create virtual device {name:?}: {source}")]
    Create {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to virtual device {name:?}: {source}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("event stream closed")]
    Closed,
}

/// A physical device's event stream.
#[async_trait]
pub trait EventSource: Send {
    /// Waits for the next event.  Blocks (asynchronously) while the device is
    /// idle.  Returns [`DeviceError::Closed`] once the stream has ended.
    async fn next_event(&mut self) -> Result<InputEvent, DeviceError>;
}

/// Exclusive claim on a physical device.
pub trait Grab: Send {
    /// Stops every other consumer, the desktop included, from seeing events.
    fn grab(&mut self) -> Result<(), DeviceError>;

    /// Gives the device back to the rest of the system.
    fn ungrab(&mut self) -> Result<(), DeviceError>;
}

/// A virtual output device.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send {
    /// Writes `event` followed by a `SYN_REPORT`, so consumers observe a
    /// complete frame.
    fn emit(&mut self, event: &InputEvent) -> Result<(), DeviceError>;
}

/// A sink written from more than one place (keyboard monitor and scroll tasks).
pub type SharedSink = Arc<Mutex<dyn EventSink>>;

/// Wraps a sink for sharing.
pub fn share_sink<S: EventSink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}

/// Emits one event through a shared sink.
///
/// A poisoned lock only means another writer panicked mid-emit; the device
/// itself is still usable, so the guard is recovered.
pub fn emit_shared(sink: &SharedSink, event: &InputEvent) -> Result<(), DeviceError> {
    let mut guard = sink.lock().unwrap_or_else(PoisonError::into_inner);
    guard.emit(event)
}
