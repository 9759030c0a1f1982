//! Coordination state shared by the selection resolver and transform editor

use crate::event_bus::{EditorEvent, EventBus};
use crate::settings::{Setting, SettingsSubscription};
use atelier_core::RecordId;

/// Explicit coordination object for one editor session.
///
/// Holds the current selection and the flags that external workflows flip
/// (deletion in progress, editor active). Selection changes are announced on
/// the event bus.
pub struct EditorContext {
    selection: Option<RecordId>,
    deletion_in_progress: bool,
    editor_active: bool,
    events: EventBus,
    settings: Option<SettingsSubscription>,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorContext {
    pub fn new() -> Self {
        Self {
            selection: None,
            deletion_in_progress: false,
            editor_active: true,
            events: EventBus::new(),
            settings: None,
        }
    }

    /// Context fed by a settings subscription; see [`EditorContext::apply_settings`]
    pub fn with_settings(settings: SettingsSubscription) -> Self {
        Self {
            settings: Some(settings),
            ..Self::new()
        }
    }

    pub fn selection(&self) -> Option<&RecordId> {
        self.selection.as_ref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.as_ref().is_some_and(|s| s == id)
    }

    pub fn select(&mut self, id: RecordId) {
        if self.selection.as_ref() == Some(&id) {
            return;
        }
        self.selection = Some(id.clone());
        self.events.push(EditorEvent::Selected(id));
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.events.push(EditorEvent::Deselected);
        }
    }

    pub fn deletion_in_progress(&self) -> bool {
        self.deletion_in_progress
    }

    pub fn set_deletion_in_progress(&mut self, value: bool) {
        self.deletion_in_progress = value;
    }

    pub fn editor_active(&self) -> bool {
        self.editor_active
    }

    pub fn set_editor_active(&mut self, value: bool) {
        self.editor_active = value;
    }

    /// Apply pending setting changes. Call once at the start of each frame.
    pub fn apply_settings(&mut self) -> usize {
        let Some(settings) = &self.settings else {
            return 0;
        };
        let pending = settings.drain();
        for setting in &pending {
            match *setting {
                Setting::EditorActive(active) => {
                    self.editor_active = active;
                    if !active {
                        self.clear_selection();
                    }
                }
                Setting::DeletionInProgress(value) => self.deletion_in_progress = value,
            }
        }
        pending.len()
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain()
    }
}
