//! Integration tests for the keyboard and touchpad monitors running together.
//!
//! # Purpose
//!
//! These tests drive both monitors through their public `run` loops, fed by
//! mock event sources, exactly as the daemon wires them.  They verify:
//!
//! - Scroll cadence: one tick on press, then one every repeat interval after
//!   the initial delay, and nothing after release.
//! - The latch rule: a key's press and release go to the same place even when
//!   the finger lands or lifts while the key is held.
//! - Passthrough fidelity: unmapped events come out in the order they went in.
//! - Shutdown: the keyboard grab is released exactly once.
//!
//! # Paused time
//!
//! `#[tokio::test(start_paused = true)]` freezes the Tokio clock.  When every
//! task is idle the runtime jumps straight to the next timer, so a
//! one-second hold takes microseconds and tick timestamps are exact.

use std::sync::Arc;
use std::time::Duration;

use padmouse::application::devices::share_sink;
use padmouse::application::remap_keys::KeyboardMonitor;
use padmouse::application::scroll_tasks::{wheel_tick, ScrollTiming};
use padmouse::application::session::Session;
use padmouse::application::track_touch::TouchpadMonitor;
use padmouse::infrastructure::devices::mock::{MockEventFeeder, MockEventSource, RecordingSink};
use padmouse::infrastructure::shutdown::GrabGuard;
use padmouse_core::input::codes::{
    ABS_MT_TOUCH_MAJOR, BTN_LEFT, BTN_TOUCH, KEY_A, KEY_COMMA, KEY_I, KEY_J, KEY_L,
};
use padmouse_core::{ActionTable, EventKind, InputEvent, TouchClassifier};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

// ── Harness ───────────────────────────────────────────────────────────────────

struct Rig {
    session: Arc<Session>,
    keys: MockEventFeeder,
    touch: MockEventFeeder,
    passthrough: RecordingSink,
    mouse: RecordingSink,
    keyboard_task: JoinHandle<()>,
    touchpad_task: JoinHandle<()>,
}

impl Rig {
    fn start() -> Self {
        let passthrough = RecordingSink::new();
        let mouse = RecordingSink::new();
        let session = Arc::new(Session::new(
            ActionTable::with_defaults(),
            share_sink(mouse.clone()),
            ScrollTiming::default(),
        ));

        let (mut keyboard, keys) = MockEventSource::new();
        let (mut touchpad, touch) = MockEventSource::new();

        let mut keyboard_monitor =
            KeyboardMonitor::new(Arc::clone(&session), Box::new(passthrough.clone()));
        let mut touchpad_monitor =
            TouchpadMonitor::new(Arc::clone(&session), TouchClassifier::new(ABS_MT_TOUCH_MAJOR, None));

        let keyboard_task = tokio::spawn(async move {
            keyboard_monitor.run(&mut keyboard).await.expect("keyboard monitor");
        });
        let touchpad_task = tokio::spawn(async move {
            touchpad_monitor.run(&mut touchpad).await.expect("touchpad monitor");
        });

        Self {
            session,
            keys,
            touch,
            passthrough,
            mouse,
            keyboard_task,
            touchpad_task,
        }
    }

    fn finger(&self, down: bool) {
        self.touch.send(InputEvent::key(BTN_TOUCH, i32::from(down)));
        self.touch.send(InputEvent::new(EventKind::Synchronization, 0, 0));
    }

    /// Lets both monitors drain their queues.
    async fn settle(&self) {
        sleep(Duration::from_millis(1)).await;
    }

    async fn stop(self) {
        drop(self.keys);
        drop(self.touch);
        self.keyboard_task.await.expect("keyboard task");
        self.touchpad_task.await.expect("touchpad task");
        self.session.scroll_tasks().cancel_all();
    }
}

fn wheel_ticks(sink: &RecordingSink) -> Vec<(Instant, InputEvent)> {
    sink.timed_events()
        .into_iter()
        .filter(|(_, e)| e.kind == EventKind::Relative)
        .collect()
}

// ── Scroll cadence ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_scroll_hold_emits_immediate_tick_then_repeats() {
    // Arrange
    let rig = Rig::start();
    rig.finger(true);
    rig.settle().await;

    // Act – hold KEY_I for 1.02 s
    let pressed_at = Instant::now();
    rig.keys.press(KEY_I);
    sleep(Duration::from_millis(1020)).await;
    rig.keys.release(KEY_I);
    rig.settle().await;
    sleep(Duration::from_millis(500)).await;

    // Assert – t=0, then 500, 550, ... 1000
    let ticks = wheel_ticks(&rig.mouse);
    assert_eq!(ticks.len(), 12, "ticks: {ticks:?}");
    assert!(ticks.iter().all(|(_, e)| *e == wheel_tick(1)));
    let offsets: Vec<u64> = ticks
        .iter()
        .map(|(at, _)| at.duration_since(pressed_at).as_millis() as u64)
        .collect();
    let expected: Vec<u64> = std::iter::once(0).chain((500..=1000).step_by(50)).collect();
    assert_eq!(offsets, expected);
    assert!(rig.passthrough.is_empty());

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_short_scroll_tap_emits_exactly_one_tick() {
    // Arrange
    let rig = Rig::start();
    rig.finger(true);
    rig.settle().await;

    // Act – 0.3 s is shorter than the initial delay
    rig.keys.press(KEY_COMMA);
    sleep(Duration::from_millis(300)).await;
    rig.keys.release(KEY_COMMA);
    rig.settle().await;
    sleep(Duration::from_secs(2)).await;

    // Assert
    let ticks = wheel_ticks(&rig.mouse);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].1, wheel_tick(-1));
    assert_eq!(rig.session.scroll_tasks().task_count(), 0);

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_scroll_keeps_going_after_finger_lifts() {
    // Arrange
    let rig = Rig::start();
    rig.finger(true);
    rig.settle().await;

    // Act – lift shortly after pressing, keep holding the key
    rig.keys.press(KEY_I);
    rig.settle().await;
    rig.finger(false);
    sleep(Duration::from_millis(620)).await;
    rig.keys.release(KEY_I);
    rig.settle().await;

    // Assert – 0, 500, 550, 600
    assert_eq!(wheel_ticks(&rig.mouse).len(), 4);
    assert_eq!(rig.passthrough.events(), Vec::new());

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_scroll_key_autorepeat_is_dropped_and_does_not_add_ticks() {
    // Arrange
    let rig = Rig::start();
    rig.finger(true);
    rig.settle().await;

    // Act – kernel autorepeat arrives every 33 ms after a 250 ms delay
    rig.keys.press(KEY_I);
    sleep(Duration::from_millis(250)).await;
    for _ in 0..12 {
        rig.keys.send(InputEvent::key(KEY_I, 2));
        sleep(Duration::from_millis(33)).await;
    }
    // 646 ms held: ticks at 0, 500, 550, 600
    rig.keys.release(KEY_I);
    rig.settle().await;

    // Assert
    assert!(rig.passthrough.is_empty(), "got {:?}", rig.passthrough.events());
    assert_eq!(wheel_ticks(&rig.mouse).len(), 4);
    assert_eq!(rig.session.scroll_tasks().task_count(), 0);

    rig.stop().await;
}

// ── Latch ─────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_press_before_touch_stays_a_keystroke() {
    // Arrange
    let rig = Rig::start();

    // Act – finger lands while J is held
    rig.keys.press(KEY_J);
    rig.settle().await;
    rig.finger(true);
    rig.settle().await;
    rig.keys.release(KEY_J);
    rig.settle().await;

    // Assert
    assert_eq!(
        rig.passthrough.events(),
        vec![InputEvent::key(KEY_J, 1), InputEvent::key(KEY_J, 0)]
    );
    assert!(rig.mouse.is_empty());

    rig.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_press_during_touch_releases_button_after_lift() {
    // Arrange
    let rig = Rig::start();
    rig.finger(true);
    rig.settle().await;

    // Act – finger lifts while J is held
    rig.keys.press(KEY_J);
    rig.settle().await;
    rig.finger(false);
    rig.settle().await;
    rig.keys.release(KEY_J);
    rig.settle().await;

    // Assert
    assert_eq!(
        rig.mouse.events(),
        vec![InputEvent::key(BTN_LEFT, 1), InputEvent::key(BTN_LEFT, 0)]
    );
    assert!(rig.passthrough.is_empty());

    // A fresh press after the lift types again.
    rig.keys.press(KEY_J);
    rig.keys.release(KEY_J);
    rig.settle().await;
    assert_eq!(
        rig.passthrough.events(),
        vec![InputEvent::key(KEY_J, 1), InputEvent::key(KEY_J, 0)]
    );

    rig.stop().await;
}

// ── Passthrough ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_unmapped_traffic_is_forwarded_in_order_while_touching() {
    // Arrange
    let rig = Rig::start();
    rig.finger(true);
    rig.settle().await;
    let typed = vec![
        InputEvent::new(EventKind::Other(0x04), 0x04, 0x70004),
        InputEvent::key(KEY_A, 1),
        InputEvent::new(EventKind::Synchronization, 0, 0),
        InputEvent::key(KEY_A, 2),
        InputEvent::key(KEY_A, 0),
        InputEvent::new(EventKind::Synchronization, 0, 0),
    ];

    // Act – a mapped button tap in the middle must not disturb the order
    for event in &typed[..3] {
        rig.keys.send(*event);
    }
    rig.keys.press(KEY_L);
    rig.keys.release(KEY_L);
    for event in &typed[3..] {
        rig.keys.send(*event);
    }
    rig.settle().await;

    // Assert
    assert_eq!(rig.passthrough.events(), typed);
    assert_eq!(rig.mouse.len(), 2);

    rig.stop().await;
}

// ── Shutdown ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_grab_once_and_stops_scrolling() {
    // Arrange
    let mouse = RecordingSink::new();
    let session = Arc::new(Session::new(
        ActionTable::with_defaults(),
        share_sink(mouse.clone()),
        ScrollTiming::default(),
    ));
    session.activation().set(true);
    let (keyboard, keys) = MockEventSource::new();
    let log = keyboard.grab_log();
    let mut guard = GrabGuard::acquire(keyboard).expect("grab");
    let mut monitor = KeyboardMonitor::new(Arc::clone(&session), Box::new(RecordingSink::new()));

    // Act – start a scroll, then stop the daemon the way main does
    keys.press(KEY_I);
    tokio::select! {
        _ = monitor.run(guard.device_mut()) => panic!("source should stay open"),
        _ = sleep(Duration::from_millis(580)) => {}
    }
    guard.release();
    session.scroll_tasks().cancel_all();
    guard.release();
    let ticks_at_shutdown = wheel_ticks(&mouse).len();
    sleep(Duration::from_secs(1)).await;

    // Assert
    assert_eq!(log.grab_count(), 1);
    assert_eq!(log.ungrab_count(), 1);
    assert!(!log.is_held());
    assert_eq!(ticks_at_shutdown, 3);
    assert_eq!(wheel_ticks(&mouse).len(), ticks_at_shutdown);
    assert_eq!(session.scroll_tasks().task_count(), 0);
    drop(keys);
}
