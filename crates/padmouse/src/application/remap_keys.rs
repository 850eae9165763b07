//! KeyboardMonitor: remaps the grabbed keyboard's events.
//!
//! Every event read from the physical keyboard goes through
//! [`padmouse_core::decide`] and then to exactly one place:
//!
//! | Decision       | Output                                                |
//! |----------------|-------------------------------------------------------|
//! | `Forward`      | passthrough device, unchanged                         |
//! | `MouseButton`  | virtual mouse, `BTN_*` with the key's press/release   |
//! | `ScrollStart`  | virtual mouse, one `REL_WHEEL` tick, then repeat task |
//! | `ScrollStop`   | nothing emitted; repeat task cancelled                |
//!
//! The keyboard is grabbed, so anything not written to the passthrough device
//! never reaches the desktop.  Events are handled one at a time in arrival
//! order and never buffered.

use std::sync::Arc;

use padmouse_core::{decide, Decision, InputEvent};
use tracing::{debug, info};

use super::devices::{DeviceError, EventSink, EventSource};
use super::scroll_tasks::wheel_tick;
use super::session::Session;

pub struct KeyboardMonitor {
    session: Arc<Session>,
    passthrough: Box<dyn EventSink>,
}

impl KeyboardMonitor {
    pub fn new(session: Arc<Session>, passthrough: Box<dyn EventSink>) -> Self {
        Self {
            session,
            passthrough,
        }
    }

    /// Handles one keyboard event.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Write`] if a virtual device rejects the write.
    /// Such failures are not retried.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<(), DeviceError> {
        let session = &self.session;
        match decide(session.table(), session.activation(), event) {
            Decision::Forward(event) => self.passthrough.emit(&event),
            Decision::MouseButton { button, pressed } => {
                debug!(key = event.code, ?button, pressed, "mouse button");
                session.emit_mouse(&InputEvent::key(button.code(), i32::from(pressed)))
            }
            Decision::ScrollStart { code, delta } => {
                debug!(key = code, delta, "scroll start");
                session.emit_mouse(&wheel_tick(delta))?;
                session.scroll_tasks().add_scroll_task(code, delta);
                Ok(())
            }
            Decision::ScrollStop { code } => {
                debug!(key = code, "scroll stop");
                session.scroll_tasks().remove_scroll_task(code);
                Ok(())
            }
            Decision::Suppress => Ok(()),
        }
    }

    /// Reads and handles events until the source ends or fails.
    ///
    /// Returns `Ok(())` when the source reports [`DeviceError::Closed`].
    ///
    /// # Errors
    ///
    /// Propagates read errors from `source` and write errors from
    /// [`KeyboardMonitor::handle_event`].
    pub async fn run<S>(&mut self, source: &mut S) -> Result<(), DeviceError>
    where
        S: EventSource + ?Sized,
    {
        loop {
            let event = match source.next_event().await {
                Ok(event) => event,
                Err(DeviceError::Closed) => {
                    info!("keyboard event stream closed");
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            self.handle_event(&event)?;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::devices::{share_sink, MockEventSink};
    use crate::application::scroll_tasks::ScrollTiming;
    use crate::infrastructure::devices::mock::{MockEventSource, RecordingSink};
    use padmouse_core::input::codes::{
        BTN_LEFT, BTN_MIDDLE, KEY_A, KEY_COMMA, KEY_I, KEY_J, KEY_K,
    };
    use padmouse_core::{ActionTable, EventKind};

    struct Harness {
        monitor: KeyboardMonitor,
        session: Arc<Session>,
        passthrough: RecordingSink,
        mouse: RecordingSink,
    }

    fn make_monitor(touching: bool) -> Harness {
        let mouse = RecordingSink::new();
        let passthrough = RecordingSink::new();
        let session = Arc::new(Session::new(
            ActionTable::with_defaults(),
            share_sink(mouse.clone()),
            ScrollTiming::default(),
        ));
        session.activation().set(touching);
        let monitor = KeyboardMonitor::new(Arc::clone(&session), Box::new(passthrough.clone()));
        Harness {
            monitor,
            session,
            passthrough,
            mouse,
        }
    }

    // ── Passthrough ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unbound_keys_are_forwarded_in_order() {
        // Arrange
        let mut h = make_monitor(true);
        let events = [
            InputEvent::new(EventKind::Other(0x04), 0x04, 0x70004),
            InputEvent::key(KEY_A, 1),
            InputEvent::new(EventKind::Synchronization, 0, 0),
            InputEvent::key(KEY_A, 2),
            InputEvent::key(KEY_A, 0),
        ];

        // Act
        for event in &events {
            h.monitor.handle_event(event).unwrap();
        }

        // Assert
        assert_eq!(h.passthrough.events(), events.to_vec());
        assert!(h.mouse.is_empty());
    }

    #[tokio::test]
    async fn test_bound_key_without_touch_is_forwarded_verbatim() {
        // Arrange
        let mut h = make_monitor(false);

        // Act
        h.monitor.handle_event(&InputEvent::key(KEY_J, 1)).unwrap();
        h.monitor.handle_event(&InputEvent::key(KEY_J, 0)).unwrap();

        // Assert
        assert_eq!(
            h.passthrough.events(),
            vec![InputEvent::key(KEY_J, 1), InputEvent::key(KEY_J, 0)]
        );
        assert!(h.mouse.is_empty());
    }

    // ── Buttons ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_button_key_produces_single_pulse_and_is_never_forwarded() {
        // Arrange – a strict mock: the passthrough device must not be touched
        let mouse = RecordingSink::new();
        let session = Arc::new(Session::new(
            ActionTable::with_defaults(),
            share_sink(mouse.clone()),
            ScrollTiming::default(),
        ));
        session.activation().set(true);
        let mut passthrough = MockEventSink::new();
        passthrough.expect_emit().never();
        let mut monitor = KeyboardMonitor::new(Arc::clone(&session), Box::new(passthrough));

        // Act
        monitor.handle_event(&InputEvent::key(KEY_J, 1)).unwrap();
        monitor.handle_event(&InputEvent::key(KEY_J, 0)).unwrap();

        // Assert
        assert_eq!(
            mouse.events(),
            vec![InputEvent::key(BTN_LEFT, 1), InputEvent::key(BTN_LEFT, 0)]
        );
    }

    #[tokio::test]
    async fn test_held_button_key_autorepeat_is_dropped() {
        // Arrange
        let mut h = make_monitor(true);

        // Act – held past the kernel repeat delay
        for value in [1, 2, 2, 0] {
            h.monitor.handle_event(&InputEvent::key(KEY_J, value)).unwrap();
        }

        // Assert
        assert!(h.passthrough.is_empty(), "got {:?}", h.passthrough.events());
        assert_eq!(
            h.mouse.events(),
            vec![InputEvent::key(BTN_LEFT, 1), InputEvent::key(BTN_LEFT, 0)]
        );
    }

    #[tokio::test]
    async fn test_unlatched_bound_key_autorepeat_is_forwarded() {
        // Arrange
        let mut h = make_monitor(false);
        let events = [
            InputEvent::key(KEY_J, 1),
            InputEvent::key(KEY_J, 2),
            InputEvent::key(KEY_J, 2),
            InputEvent::key(KEY_J, 0),
        ];

        // Act
        for event in &events {
            h.monitor.handle_event(event).unwrap();
        }

        // Assert
        assert_eq!(h.passthrough.events(), events.to_vec());
        assert!(h.mouse.is_empty());
    }

    #[tokio::test]
    async fn test_late_activation_release_is_forwarded() {
        // Arrange: press K without touch
        let mut h = make_monitor(false);
        h.monitor.handle_event(&InputEvent::key(KEY_K, 1)).unwrap();

        // Act – touch arrives while K is held
        h.session.activation().set(true);
        h.monitor.handle_event(&InputEvent::key(KEY_K, 0)).unwrap();

        // Assert
        assert_eq!(
            h.passthrough.events(),
            vec![InputEvent::key(KEY_K, 1), InputEvent::key(KEY_K, 0)]
        );
        assert!(h.mouse.is_empty());
    }

    #[tokio::test]
    async fn test_button_release_reaches_mouse_after_touch_lifts() {
        // Arrange
        let mut h = make_monitor(true);
        h.monitor.handle_event(&InputEvent::key(KEY_K, 1)).unwrap();

        // Act
        h.session.activation().set(false);
        h.monitor.handle_event(&InputEvent::key(KEY_K, 0)).unwrap();

        // Assert
        assert_eq!(
            h.mouse.events(),
            vec![InputEvent::key(BTN_MIDDLE, 1), InputEvent::key(BTN_MIDDLE, 0)]
        );
        assert!(h.passthrough.is_empty());
    }

    // ── Scroll ────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_scroll_press_emits_tick_and_registers_task() {
        // Arrange
        let mut h = make_monitor(true);

        // Act
        h.monitor.handle_event(&InputEvent::key(KEY_I, 1)).unwrap();

        // Assert
        assert_eq!(h.mouse.events(), vec![wheel_tick(1)]);
        assert!(h.session.scroll_tasks().is_running(KEY_I));
        assert!(h.passthrough.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_release_cancels_task() {
        // Arrange
        let mut h = make_monitor(true);
        h.monitor.handle_event(&InputEvent::key(KEY_COMMA, 1)).unwrap();

        // Act
        h.monitor.handle_event(&InputEvent::key(KEY_COMMA, 0)).unwrap();

        // Assert
        assert_eq!(h.session.scroll_tasks().task_count(), 0);
        assert_eq!(h.mouse.events(), vec![wheel_tick(-1)]);
        assert!(h.passthrough.is_empty());
    }

    // ── Errors ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_passthrough_write_failure_propagates() {
        let mut h = make_monitor(false);
        h.passthrough.set_should_fail(true);
        let result = h.monitor.handle_event(&InputEvent::key(KEY_A, 1));
        assert!(matches!(result, Err(DeviceError::Write { .. })));
    }

    #[tokio::test]
    async fn test_mouse_write_failure_propagates() {
        let mut h = make_monitor(true);
        h.mouse.set_should_fail(true);
        let result = h.monitor.handle_event(&InputEvent::key(KEY_J, 1));
        assert!(matches!(result, Err(DeviceError::Write { .. })));
    }

    // ── run() ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_run_processes_source_until_closed() {
        // Arrange
        let mut h = make_monitor(false);
        let (mut source, feeder) = MockEventSource::new();
        feeder.press(KEY_A);
        feeder.release(KEY_A);
        drop(feeder);

        // Act
        let result = h.monitor.run(&mut source).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(h.passthrough.len(), 2);
    }
}
