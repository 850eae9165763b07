//! TouchpadMonitor: keeps the activation flag in step with finger contact.
//!
//! The touchpad is read but never grabbed; the desktop keeps receiving its
//! pointer motion as usual.  This monitor only classifies contact events and
//! writes the result to the session's [`padmouse_core::ActivationState`].  It
//! emits nothing and takes no locks, so it can never stall keyboard handling.

use std::sync::Arc;

use padmouse_core::{InputEvent, TouchClassifier};
use tracing::{debug, info};

use super::devices::{DeviceError, EventSource};
use super::session::Session;

pub struct TouchpadMonitor {
    session: Arc<Session>,
    classifier: TouchClassifier,
}

impl TouchpadMonitor {
    pub fn new(session: Arc<Session>, classifier: TouchClassifier) -> Self {
        Self {
            session,
            classifier,
        }
    }

    /// Feeds one touchpad event to the classifier and publishes any change.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let Some(touching) = self.classifier.observe(event) {
            self.session.activation().set(touching);
            debug!(touching, "touch state changed");
        }
    }

    /// Reads events until the source ends or fails.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than [`DeviceError::Closed`].
    pub async fn run<S>(&mut self, source: &mut S) -> Result<(), DeviceError>
    where
        S: EventSource + ?Sized,
    {
        loop {
            match source.next_event().await {
                Ok(event) => self.handle_event(&event),
                Err(DeviceError::Closed) => {
                    info!("touchpad event stream closed");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }
}
