//! Atelier Editor - interactive editing on top of the synchronized scene
//!
//! Provides the editing building blocks:
//! - `selection` - pointer hit to editable entity, with group promotion and modifier override
//! - `TransformEditor` - gizmo mode state machine and debounced transform writes
//! - `EditorContext` - selection and coordination flags shared by both
//! - `EditorConfig` - layered TOML/env configuration
//! - `Clock` - injectable time source
//! - `SettingsHub` / `EventBus` - subscribe/notify plumbing

mod clock;
mod config;
mod context;
mod event_bus;
pub mod selection;
mod settings;
mod transform_editor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    EditorConfig, EditorSection, SyncSection, ENV_MIN_WRITE_INTERVAL, ENV_QUICK_INTERACTION,
};
pub use context::EditorContext;
pub use event_bus::{EditorEvent, EventBus};
pub use selection::{pick_at, resolve, SelectionOutcome};
pub use settings::{Setting, SettingsHub, SettingsSubscription};
pub use transform_editor::{
    GizmoAxis, GizmoDelta, GizmoMode, TransformEditor, TransformEditorConfig, WriteOutcome,
};
