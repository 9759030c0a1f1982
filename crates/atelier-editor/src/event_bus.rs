//! Event bus for editor state changes

use crate::transform_editor::GizmoMode;
use atelier_core::RecordId;
use atelier_scene::Diagnostic;

/// Something the rest of the editor (UI chrome, inspectors) may react to
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Selected(RecordId),
    Deselected,
    ModeChanged(GizmoMode),
    TransformWritten(RecordId),
    Diagnostic(Diagnostic),
}

/// A simple event queue that the core pushes to and consumers drain
pub struct EventBus {
    events: Vec<EditorEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    /// Drain all events from the bus, returning them
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        bus.push(EditorEvent::Selected(RecordId::from("a")));
        bus.push(EditorEvent::ModeChanged(GizmoMode::Rotate));

        assert_eq!(bus.len(), 2);
        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                EditorEvent::Selected(RecordId::from("a")),
                EditorEvent::ModeChanged(GizmoMode::Rotate),
            ]
        );
        assert!(bus.is_empty());
    }

    #[test]
    fn test_drain_clears() {
        let mut bus = EventBus::new();
        bus.push(EditorEvent::Deselected);

        let _ = bus.drain();
        assert!(bus.drain().is_empty());
    }
}
