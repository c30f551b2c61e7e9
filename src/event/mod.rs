use crate::history::HistoryEntry;

mod bus;
pub use bus::EventBus;

/// Notifications the engine raises toward the host layer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Emitted on every history push/undo/redo with the full snapshot
    /// sequence and the current cursor.
    HistoryChanged {
        sequence: Vec<HistoryEntry>,
        cursor: usize,
    },
    /// Emitted before `load` starts any work. `heavy` flags filtered modes
    /// so the host can show a busy indicator.
    LoadStarted { heavy: bool },
    /// Emitted after `load` finishes, even on failure.
    LoadFinished { ok: bool },
}

/// Receives engine events. Implemented for plain closures so hosts can
/// subscribe without a dedicated type.
pub trait EventHandler {
    fn handle_event(&mut self, event: &EngineEvent);
}

impl<F: FnMut(&EngineEvent)> EventHandler for F {
    fn handle_event(&mut self, event: &EngineEvent) {
        self(event)
    }
}
