//! Pointer hit -> editable entity resolution

use crate::context::EditorContext;
use crate::event_bus::EditorEvent;
use atelier_core::RecordId;
use atelier_scene::{pick_node, Camera, Diagnostic, NodeHandle, NodeKind, Ray, SceneGraph};

/// What a pointer selection did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(RecordId),
    Cleared,
    /// The hit did not resolve to an editable entity; selection unchanged
    Rejected,
}

/// Resolve a raw pointer hit into a selection change.
///
/// Without the modifier, the nearest tagged Group above the hit wins so
/// clicking any part of a composite selects the composite. With the
/// modifier, the raw hit itself is the candidate. Selecting the current
/// selection again clears it.
pub fn resolve(
    ctx: &mut EditorContext,
    graph: &SceneGraph,
    hit: Option<NodeHandle>,
    modifier: bool,
) -> SelectionOutcome {
    let Some(hit) = hit else {
        ctx.clear_selection();
        return SelectionOutcome::Cleared;
    };

    let candidate = if modifier {
        editable_id(graph, hit)
    } else {
        promoted_group(graph, hit).or_else(|| editable_id(graph, hit))
    };

    let Some(id) = candidate else {
        log::debug!("{}", Diagnostic::InvalidSelectionTarget);
        ctx.events_mut()
            .push(EditorEvent::Diagnostic(Diagnostic::InvalidSelectionTarget));
        return SelectionOutcome::Rejected;
    };

    if ctx.is_selected(id.as_str()) {
        ctx.clear_selection();
        SelectionOutcome::Cleared
    } else {
        ctx.select(id.clone());
        SelectionOutcome::Selected(id)
    }
}

/// Deepest mesh node under a screen point
pub fn pick_at(
    graph: &SceneGraph,
    camera: &Camera,
    screen_x: f32,
    screen_y: f32,
    viewport: (f32, f32),
) -> Option<NodeHandle> {
    let ray = Ray::from_screen(screen_x, screen_y, viewport.0, viewport.1, camera);
    pick_node(graph, &ray).map(|(node, _)| node)
}

fn editable_id(graph: &SceneGraph, node: NodeHandle) -> Option<RecordId> {
    if node == graph.root() {
        return None;
    }
    graph
        .tag(node)
        .filter(|tag| tag.is_editable())
        .map(|tag| tag.id)
}

/// Nearest tagged Group strictly above `node`, stopping at the render root
fn promoted_group(graph: &SceneGraph, node: NodeHandle) -> Option<RecordId> {
    let root = graph.root();
    graph
        .ancestors(node)
        .into_iter()
        .take_while(|ancestor| *ancestor != root)
        .filter(|ancestor| graph.kind(*ancestor) == Some(NodeKind::Group))
        .find_map(|group| editable_id(graph, group))
}
