//! ScrollTaskManager: one repeating wheel emitter per held scroll key.
//!
//! # Lifecycle of a scroll key (for beginners)
//!
//! ```text
//! press   ──► keyboard monitor emits 1 tick ──► add_scroll_task(code, delta)
//!                                                  │
//!                                     wait initial_delay (500 ms)
//!                                                  │
//!                              ┌──► latch still set? ──no──► task ends
//!                              │          │ yes
//!                              │     emit 1 tick
//!                              └── wait repeat_interval (50 ms)
//!
//! release ──► remove_scroll_task(code) ──► task aborted immediately
//! ```
//!
//! Two stop paths exist on purpose.  `remove_scroll_task` is the primary one
//! and stops the emitter within the same step as the key release.  The
//! latch check inside the loop catches the case where the latch was cleared
//! without a release reaching this manager.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use padmouse_core::input::codes::REL_WHEEL;
use padmouse_core::{ActionTable, InputEvent};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::devices::{emit_shared, SharedSink};

/// Delay between the first tick (on press) and the first repeat.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Interval between repeats, ≈ 20 Hz.
pub const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Scroll cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTiming {
    pub initial_delay: Duration,
    pub repeat_interval: Duration,
}

impl Default for ScrollTiming {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
        }
    }
}

/// A single `REL_WHEEL` tick of `delta`.
pub fn wheel_tick(delta: i32) -> InputEvent {
    InputEvent::relative(REL_WHEEL, delta)
}

/// Registry of live scroll tasks, keyed by source key code.
pub struct ScrollTaskManager {
    table: Arc<ActionTable>,
    mouse: SharedSink,
    timing: ScrollTiming,
    tasks: Mutex<HashMap<u16, JoinHandle<()>>>,
}

impl ScrollTaskManager {
    pub fn new(table: Arc<ActionTable>, mouse: SharedSink, timing: ScrollTiming) -> Self {
        Self {
            table,
            mouse,
            timing,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Starts the repeating emitter for `code` unless one is already running.
    ///
    /// Returns `true` if a new task was spawned.  Must be called from within a
    /// Tokio runtime.
    pub fn add_scroll_task(&self, code: u16, delta: i32) -> bool {
        let mut tasks = self.lock_tasks();
        if let Some(existing) = tasks.get(&code) {
            if !existing.is_finished() {
                return false;
            }
        }

        let handle = tokio::spawn(repeat_scroll(
            Arc::clone(&self.table),
            Arc::clone(&self.mouse),
            self.timing,
            code,
            delta,
        ));
        tasks.insert(code, handle);
        debug!(code, delta, "scroll task started");
        true
    }

    /// Cancels and forgets the task for `code`.  Returns `true` if one existed.
    pub fn remove_scroll_task(&self, code: u16) -> bool {
        match self.lock_tasks().remove(&code) {
            Some(handle) => {
                handle.abort();
                debug!(code, "scroll task cancelled");
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a task for `code` is registered and not finished.
    pub fn is_running(&self, code: u16) -> bool {
        self.lock_tasks()
            .get(&code)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.lock_tasks().len()
    }

    /// Cancels every task.  Called once on shutdown.
    pub fn cancel_all(&self) {
        let mut tasks = self.lock_tasks();
        for (code, handle) in tasks.drain() {
            handle.abort();
            debug!(code, "scroll task cancelled on shutdown");
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<u16, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ScrollTaskManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Body of one scroll task.  The immediate tick on press is emitted by the
/// keyboard monitor, not here.
async fn repeat_scroll(
    table: Arc<ActionTable>,
    mouse: SharedSink,
    timing: ScrollTiming,
    code: u16,
    delta: i32,
) {
    tokio::time::sleep(timing.initial_delay).await;

    loop {
        let latched = table.get(code).is_some_and(|binding| binding.is_active());
        if !latched {
            debug!(code, "scroll latch cleared; task exiting");
            break;
        }

        if let Err(e) = emit_shared(&mouse, &wheel_tick(delta)) {
            error!(code, "scroll tick failed: {e}");
            break;
        }

        tokio::time::sleep(timing.repeat_interval).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
