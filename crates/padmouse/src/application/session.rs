//! Session: the state shared by the two monitors.
//!
//! One `Session` exists per process.  It owns the activation flag, the action
//! table, the virtual mouse, and the scroll task registry, and is handed to
//! both monitors behind an `Arc`.  The physical devices and the passthrough
//! sink are not in here: each belongs to exactly one monitor.

use std::sync::Arc;

use padmouse_core::{ActionTable, ActivationState, InputEvent};

use super::devices::{emit_shared, DeviceError, SharedSink};
use super::scroll_tasks::{ScrollTaskManager, ScrollTiming};

pub struct Session {
    activation: ActivationState,
    table: Arc<ActionTable>,
    mouse: SharedSink,
    scroll_tasks: ScrollTaskManager,
}

impl Session {
    pub fn new(table: ActionTable, mouse: SharedSink, timing: ScrollTiming) -> Self {
        let table = Arc::new(table);
        let scroll_tasks = ScrollTaskManager::new(Arc::clone(&table), Arc::clone(&mouse), timing);
        Self {
            activation: ActivationState::new(),
            table,
            mouse,
            scroll_tasks,
        }
    }

    pub fn activation(&self) -> &ActivationState {
        &self.activation
    }

    pub fn table(&self) -> &ActionTable {
        &self.table
    }

    pub fn scroll_tasks(&self) -> &ScrollTaskManager {
        &self.scroll_tasks
    }

    /// Writes one event (plus sync) to the virtual mouse.
    pub fn emit_mouse(&self, event: &InputEvent) -> Result<(), DeviceError> {
        emit_shared(&self.mouse, event)
    }
}
