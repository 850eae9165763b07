//! Keyboard grab ownership and shutdown signals.
//!
//! # Why a guard?
//!
//! While padmouse holds the keyboard grab, nothing else on the system sees a
//! single keystroke.  If the process stops without releasing it, the user is
//! left with a dead keyboard until the device node is closed.  [`GrabGuard`]
//! owns the grabbed device and releases the grab exactly once, whether
//! shutdown is explicit ([`GrabGuard::release`]) or comes from a drop during
//! unwinding.

use tracing::{info, warn};

use crate::application::devices::{DeviceError, Grab};

/// Owns a grabbed device and hands the grab back at most once.
pub struct GrabGuard<K: Grab> {
    device: K,
    held: bool,
}

impl<K: Grab> GrabGuard<K> {
    /// Grabs `device` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns the grab error unchanged; the device is dropped, which closes
    /// it.
    pub fn acquire(mut device: K) -> Result<Self, DeviceError> {
        device.grab()?;
        info!("keyboard grabbed");
        Ok(Self { device, held: true })
    }

    /// The grabbed device, for reading events.
    pub fn device_mut(&mut self) -> &mut K {
        &mut self.device
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Releases the grab.  Later calls do nothing.
    ///
    /// A failed ungrab is logged and otherwise ignored: the device is usually
    /// gone by then, and closing it releases the grab anyway.
    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        match self.device.ungrab() {
            Ok(()) => info!("keyboard grab released"),
            Err(e) => warn!("failed to release keyboard grab: {e}"),
        }
    }
}

impl<K: Grab> Drop for GrabGuard<K> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Resolves when the process is asked to stop, returning the signal name.
///
/// Listens for Ctrl-C (SIGINT) everywhere, and for SIGTERM on Unix.  If a
/// handler cannot be installed the corresponding branch never fires.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::devices::mock::MockEventSource;

    #[test]
    fn test_acquire_grabs_device_once() {
        // Arrange
        let (source, _feeder) = MockEventSource::new();
        let log = source.grab_log();

        // Act
        let guard = GrabGuard::acquire(source).expect("grab");

        // Assert
        assert!(guard.is_held());
        assert!(log.is_held());
        assert_eq!(log.grab_count(), 1);
    }

    #[test]
    fn test_release_twice_ungrabs_once() {
        // Arrange
        let (source, _feeder) = MockEventSource::new();
        let log = source.grab_log();
        let mut guard = GrabGuard::acquire(source).expect("grab");

        // Act
        guard.release();
        guard.release();
        drop(guard);

        // Assert
        assert_eq!(log.ungrab_count(), 1);
        assert!(!log.is_held());
    }

    #[test]
    fn test_drop_releases_grab() {
        let (source, _feeder) = MockEventSource::new();
        let log = source.grab_log();
        {
            let _guard = GrabGuard::acquire(source).expect("grab");
        }
        assert_eq!(log.ungrab_count(), 1);
        assert!(!log.is_held());
    }

    #[test]
    fn test_failed_ungrab_is_swallowed() {
        // Arrange
        let (source, _feeder) = MockEventSource::new();
        let log = source.grab_log();
        log.fail_ungrab();
        let mut guard = GrabGuard::acquire(source).expect("grab");

        // Act
        guard.release();

        // Assert: no panic, no retry on drop.
        assert!(!guard.is_held());
        drop(guard);
        assert_eq!(log.ungrab_count(), 1);
    }
}
