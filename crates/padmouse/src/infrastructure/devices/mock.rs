//! Mock devices for unit and integration tests.
//!
//! # Why mock devices?
//!
//! The real adapters need `/dev/input` and `/dev/uinput`, root (or the
//! `input` group), and they move the real cursor and press real keys.  The
//! mocks replace them with in-memory channels and logs:
//!
//! - [`MockEventSource`] is fed from a [`MockEventFeeder`] and records grab /
//!   ungrab calls in a shared [`GrabLog`].
//! - [`RecordingSink`] records every emitted event with the (tokio) time it
//!   was emitted, so scroll cadence can be asserted under a paused clock.
//!
//! Both hand out cheap clones of their logs, so a test can keep observing a
//! mock after moving it into a monitor or a guard.

use std::io;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use padmouse_core::InputEvent;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::application::devices::{DeviceError, EventSink, EventSource, Grab};

// ── Source ────────────────────────────────────────────────────────────────────

/// Shared record of grab activity on a [`MockEventSource`].
#[derive(Debug, Clone, Default)]
pub struct GrabLog {
    grabs: Arc<AtomicUsize>,
    ungrabs: Arc<AtomicUsize>,
    held: Arc<AtomicBool>,
    fail_ungrab: Arc<AtomicBool>,
}

impl GrabLog {
    pub fn grab_count(&self) -> usize {
        self.grabs.load(Ordering::SeqCst)
    }

    pub fn ungrab_count(&self) -> usize {
        self.ungrabs.load(Ordering::SeqCst)
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// Makes every later `ungrab` fail, as if the device had been unplugged.
    pub fn fail_ungrab(&self) {
        self.fail_ungrab.store(true, Ordering::SeqCst);
    }
}

/// An [`EventSource`] fed by a test through a [`MockEventFeeder`].
pub struct MockEventSource {
    rx: mpsc::UnboundedReceiver<InputEvent>,
    log: GrabLog,
}

/// Sending half of a [`MockEventSource`].  Dropping it closes the stream.
#[derive(Clone)]
pub struct MockEventFeeder {
    tx: mpsc::UnboundedSender<InputEvent>,
}

impl MockEventSource {
    pub fn new() -> (Self, MockEventFeeder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            rx,
            log: GrabLog::default(),
        };
        (source, MockEventFeeder { tx })
    }

    pub fn grab_log(&self) -> GrabLog {
        self.log.clone()
    }
}

impl MockEventFeeder {
    /// Queues an event.  Panics if the source has been dropped.
    pub fn send(&self, event: InputEvent) {
        self.tx
            .send(event)
            .expect("MockEventSource dropped before feeder");
    }

    pub fn press(&self, code: u16) {
        self.send(InputEvent::key(code, 1));
    }

    pub fn release(&self, code: u16) {
        self.send(InputEvent::key(code, 0));
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn next_event(&mut self) -> Result<InputEvent, DeviceError> {
        self.rx.recv().await.ok_or(DeviceError::Closed)
    }
}

impl Grab for MockEventSource {
    fn grab(&mut self) -> Result<(), DeviceError> {
        self.log.grabs.fetch_add(1, Ordering::SeqCst);
        self.log.held.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn ungrab(&mut self) -> Result<(), DeviceError> {
        self.log.ungrabs.fetch_add(1, Ordering::SeqCst);
        if self.log.fail_ungrab.load(Ordering::SeqCst) {
            return Err(DeviceError::Ungrab {
                path: "mock".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "mock device gone"),
            });
        }
        self.log.held.store(false, Ordering::SeqCst);
        Ok(())
    }
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// An [`EventSink`] that records what it is asked to emit.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<(Instant, InputEvent)>>>,
    should_fail: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitted events in order.
    pub fn events(&self) -> Vec<InputEvent> {
        self.log.lock().unwrap().iter().map(|(_, e)| *e).collect()
    }

    /// Emitted events with their emission time.
    pub fn timed_events(&self) -> Vec<(Instant, InputEvent)> {
        self.log.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When set, every later `emit` returns [`DeviceError::Write`].
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &InputEvent) -> Result<(), DeviceError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DeviceError::Write {
                name: "recording".to_string(),
                source: io::Error::new(io::ErrorKind::BrokenPipe, "mock failure"),
            });
        }
        self.log.lock().unwrap().push((Instant::now(), *event));
        Ok(())
    }
}
