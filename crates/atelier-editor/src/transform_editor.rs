//! Gizmo-driven transform editing with debounced store writes

use crate::context::EditorContext;
use crate::event_bus::EditorEvent;
use atelier_core::{RecordId, Result, Transform, Vec3};
use atelier_scene::{Diagnostic, NodeHandle, SceneGraph};
use atelier_store::{RecordStore, TransformPatch};
use atelier_sync::SceneSync;
use std::time::Duration;

/// Which transformation mode is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl GizmoMode {
    /// Translate -> Rotate -> Scale -> Translate
    pub fn next(self) -> Self {
        match self {
            GizmoMode::Translate => GizmoMode::Rotate,
            GizmoMode::Rotate => GizmoMode::Scale,
            GizmoMode::Scale => GizmoMode::Translate,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GizmoMode::Translate => "translate",
            GizmoMode::Rotate => "rotate",
            GizmoMode::Scale => "scale",
        }
    }
}

/// Which handle the user is dragging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    /// All three axes at once (center handle)
    Uniform,
}

impl GizmoAxis {
    fn mask(&self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::RIGHT,
            GizmoAxis::Y => Vec3::UP,
            GizmoAxis::Z => Vec3::new(0.0, 0.0, 1.0),
            GizmoAxis::Uniform => Vec3::ONE,
        }
    }
}

/// One increment of gizmo manipulation.
///
/// `amount` is world units in translate mode, degrees in rotate mode, and a
/// multiplicative factor in scale mode (1.0 = no change).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoDelta {
    pub axis: GizmoAxis,
    pub amount: f32,
}

impl GizmoDelta {
    pub fn new(axis: GizmoAxis, amount: f32) -> Self {
        Self { axis, amount }
    }

    /// Transform after applying this delta in `mode`
    pub fn apply(&self, mode: GizmoMode, transform: Transform) -> Transform {
        let mask = self.axis.mask();
        match mode {
            GizmoMode::Translate => {
                transform.with_position(transform.position + mask * self.amount)
            }
            GizmoMode::Rotate => transform.with_rotation(transform.rotation + mask * self.amount),
            GizmoMode::Scale => {
                let factor = Vec3::ONE + mask * (self.amount - 1.0);
                transform.with_scale(transform.scale.mul_elem(&factor))
            }
        }
    }
}

/// Result of a transform-change notification
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The live transform was written to the store
    Written(RecordId),
    /// Dropped: the previous write was too recent
    Debounced,
    /// Dropped: a deletion is in progress
    SuppressedByDeletion,
    /// No gizmo attachment, or it went stale
    NoTarget,
    /// Nothing left to flush on release
    Idle,
}

/// Timing settings for the transform editor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformEditorConfig {
    /// Two interactions closer than this advance the gizmo mode
    pub quick_interaction_window: Duration,
    /// Minimum spacing between accepted store writes
    pub min_write_interval: Duration,
    /// Write the final transform on release if the last change was dropped
    pub flush_on_release: bool,
}

impl Default for TransformEditorConfig {
    fn default() -> Self {
        Self {
            quick_interaction_window: Duration::from_millis(500),
            min_write_interval: Duration::from_millis(50),
            flush_on_release: true,
        }
    }
}

struct Attachment {
    id: RecordId,
    node: NodeHandle,
}

/// Attaches a gizmo to the selected node and streams edits into the store
pub struct TransformEditor {
    config: TransformEditorConfig,
    mode: GizmoMode,
    attachment: Option<Attachment>,
    last_interaction: Option<Duration>,
    last_write: Option<Duration>,
    /// The latest change was dropped by the debounce
    pending: bool,
}

impl Default for TransformEditor {
    fn default() -> Self {
        Self::new(TransformEditorConfig::default())
    }
}

impl TransformEditor {
    pub fn new(config: TransformEditorConfig) -> Self {
        Self {
            config,
            mode: GizmoMode::default(),
            attachment: None,
            last_interaction: None,
            last_write: None,
            pending: false,
        }
    }

    pub fn config(&self) -> &TransformEditorConfig {
        &self.config
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Node the gizmo is currently attached to
    pub fn attached(&self) -> Option<NodeHandle> {
        self.attachment.as_ref().map(|a| a.node)
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending
    }

    /// Attach the gizmo to the selected entity.
    ///
    /// Fails when the selection no longer resolves to a node in the rendered
    /// tree; the selection is then cleared.
    pub fn attach(
        &mut self,
        ctx: &mut EditorContext,
        graph: &SceneGraph,
        sync: &SceneSync,
    ) -> Option<NodeHandle> {
        let Some(id) = ctx.selection().cloned() else {
            self.detach();
            return None;
        };

        match sync.node_for(id.as_str()) {
            Some(node) if graph.is_in_tree(node) => {
                if self.attachment.as_ref().map(|a| &a.id) != Some(&id) {
                    self.last_write = None;
                    self.pending = false;
                }
                self.attachment = Some(Attachment { id, node });
                Some(node)
            }
            _ => {
                let diagnostic = Diagnostic::StaleSelection { id };
                log::debug!("{}", diagnostic);
                ctx.events_mut().push(EditorEvent::Diagnostic(diagnostic));
                ctx.clear_selection();
                self.detach();
                None
            }
        }
    }

    pub fn detach(&mut self) {
        self.attachment = None;
        self.pending = false;
    }

    /// Register a pointer interaction with the gizmo. Two interactions within
    /// the quick-interaction window advance the mode.
    pub fn interact(&mut self, now: Duration, ctx: &mut EditorContext) -> GizmoMode {
        let window = self.config.quick_interaction_window;
        let quick = self
            .last_interaction
            .is_some_and(|last| now.saturating_sub(last) <= window);
        if quick {
            self.last_interaction = None;
            self.advance_mode(ctx);
        } else {
            self.last_interaction = Some(now);
        }
        self.mode
    }

    /// Keyboard shortcut: advance the mode directly
    pub fn shortcut(&mut self, ctx: &mut EditorContext) -> GizmoMode {
        self.advance_mode(ctx);
        self.mode
    }

    fn advance_mode(&mut self, ctx: &mut EditorContext) {
        self.mode = self.mode.next();
        log::debug!("gizmo mode -> {}", self.mode.label());
        ctx.events_mut().push(EditorEvent::ModeChanged(self.mode));
    }

    /// Apply a gizmo manipulation to the attached node. Returns the new live
    /// transform, or None when there is nothing valid to drag.
    pub fn drag(
        &mut self,
        ctx: &EditorContext,
        graph: &mut SceneGraph,
        delta: GizmoDelta,
    ) -> Result<Option<Transform>> {
        let Some(node) = self.live_attachment(ctx, graph) else {
            return Ok(None);
        };
        let Some(current) = graph.transform(node) else {
            return Ok(None);
        };
        let updated = delta.apply(self.mode, current);
        graph.set_transform(node, updated)?;
        Ok(Some(updated))
    }

    /// The attached node's transform changed; maybe write it to the store.
    ///
    /// Writes are dropped, not queued, while a deletion is in progress or
    /// when the previous accepted write is younger than the minimum interval.
    pub fn on_transform_changed<S: RecordStore>(
        &mut self,
        now: Duration,
        ctx: &mut EditorContext,
        graph: &SceneGraph,
        store: &mut S,
    ) -> Result<WriteOutcome> {
        if ctx.deletion_in_progress() {
            self.pending = false;
            return Ok(WriteOutcome::SuppressedByDeletion);
        }
        if self.live_attachment(ctx, graph).is_none() {
            return Ok(WriteOutcome::NoTarget);
        }
        if let Some(last) = self.last_write {
            if now.saturating_sub(last) < self.config.min_write_interval {
                log::debug!("transform write dropped by debounce");
                self.pending = true;
                return Ok(WriteOutcome::Debounced);
            }
        }
        self.write(now, ctx, graph, store)
    }

    /// End of a drag. Flushes the final transform when the last change was
    /// dropped and `flush_on_release` is set.
    pub fn release<S: RecordStore>(
        &mut self,
        now: Duration,
        ctx: &mut EditorContext,
        graph: &SceneGraph,
        store: &mut S,
    ) -> Result<WriteOutcome> {
        if !self.pending || !self.config.flush_on_release {
            self.pending = false;
            return Ok(WriteOutcome::Idle);
        }
        if ctx.deletion_in_progress() {
            self.pending = false;
            return Ok(WriteOutcome::SuppressedByDeletion);
        }
        if self.live_attachment(ctx, graph).is_none() {
            return Ok(WriteOutcome::NoTarget);
        }
        self.write(now, ctx, graph, store)
    }

    /// Whether the gizmo should be drawn this frame
    pub fn gizmo_visible(
        &self,
        ctx: &EditorContext,
        graph: &SceneGraph,
        sync: &SceneSync,
    ) -> bool {
        if ctx.deletion_in_progress() || !ctx.editor_active() {
            return false;
        }
        ctx.selection()
            .and_then(|id| sync.node_for(id.as_str()))
            .is_some_and(|node| graph.is_in_tree(node))
    }

    fn write<S: RecordStore>(
        &mut self,
        now: Duration,
        ctx: &mut EditorContext,
        graph: &SceneGraph,
        store: &mut S,
    ) -> Result<WriteOutcome> {
        let Some(attachment) = &self.attachment else {
            return Ok(WriteOutcome::NoTarget);
        };
        let Some(transform) = graph.transform(attachment.node) else {
            return Ok(WriteOutcome::NoTarget);
        };
        let id = attachment.id.clone();

        store.update(id.as_str(), &TransformPatch::full(&transform))?;
        self.last_write = Some(now);
        self.pending = false;
        log::trace!("wrote transform for '{}'", id);
        ctx.events_mut().push(EditorEvent::TransformWritten(id.clone()));
        Ok(WriteOutcome::Written(id))
    }

    /// The attached node, provided it is still the selection and still part
    /// of the rendered tree. A stale attachment is dropped.
    fn live_attachment(
        &mut self,
        ctx: &EditorContext,
        graph: &SceneGraph,
    ) -> Option<NodeHandle> {
        let attachment = self.attachment.as_ref()?;
        let node = attachment.node;
        if ctx.selection() == Some(&attachment.id) && graph.is_in_tree(node) {
            return Some(node);
        }
        log::debug!("gizmo attachment to '{}' dropped", attachment.id);
        self.detach();
        None
    }
}
