//! Reconciliation between the record store and the live render tree

use atelier_core::{RecordId, Result, TRANSFORM_EPSILON};
use atelier_scene::{Diagnostic, Materializer, NodeHandle, SceneGraph};
use atelier_store::{Record, Snapshot};
use bimap::BiMap;
use serde::{Deserialize, Serialize};

/// Reconciliation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Skip the first pass after mount, adopting nodes the engine already
    /// attached instead of recreating them
    pub skip_initial_pass: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            skip_initial_pass: true,
        }
    }
}

/// What one reconciliation pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    pub skipped: bool,
    /// Ids bound to nodes that were already in the tree
    pub adopted: Vec<RecordId>,
    /// Ids materialized and attached during this pass
    pub attached: Vec<RecordId>,
    /// Ids whose existing node was moved under its expected parent
    pub reattached: Vec<RecordId>,
    /// Ids whose live transform was rewritten in place
    pub updated: Vec<RecordId>,
    /// Ids whose nodes were detached and destroyed
    pub detached: Vec<RecordId>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PassReport {
    /// Whether the pass touched the render tree at all
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty()
            && self.reattached.is_empty()
            && self.updated.is_empty()
            && self.detached.is_empty()
    }
}

/// Keeps the render tree's membership in step with the store.
///
/// Owns the authoritative id <-> node bindings for every materialized
/// record, top-level and nested.
pub struct SceneSync {
    config: SyncConfig,
    bindings: BiMap<RecordId, NodeHandle>,
    /// Ids of the top-level records as of the last full pass, in store order
    top_level: Vec<RecordId>,
    mounted: bool,
    last_revision: Option<u64>,
}

impl Default for SceneSync {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl SceneSync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            bindings: BiMap::new(),
            top_level: Vec::new(),
            mounted: false,
            last_revision: None,
        }
    }

    pub fn config(&self) -> SyncConfig {
        self.config
    }

    /// Live node bound to a record id
    pub fn node_for(&self, id: &str) -> Option<NodeHandle> {
        self.bindings.get_by_left(id).copied()
    }

    /// Record id bound to a live node
    pub fn id_for(&self, node: NodeHandle) -> Option<&RecordId> {
        self.bindings.get_by_right(&node)
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.bindings.contains_left(id)
    }

    /// Number of top-level records currently attached under the root
    pub fn tracked_count(&self) -> usize {
        self.top_level.len()
    }

    /// Number of bound ids, nested records included
    pub fn bound_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn top_level_ids(&self) -> &[RecordId] {
        &self.top_level
    }

    /// Revision of the last snapshot a full pass ran against
    pub fn last_revision(&self) -> Option<u64> {
        self.last_revision
    }

    /// Run a pass only when the snapshot revision differs from the last one seen
    pub fn sync_if_changed(
        &mut self,
        snapshot: &Snapshot,
        graph: &mut SceneGraph,
        materializer: &Materializer<'_>,
    ) -> Result<Option<PassReport>> {
        if self.mounted && self.last_revision == Some(snapshot.revision()) {
            return Ok(None);
        }
        self.run_pass(snapshot, graph, materializer).map(Some)
    }

    /// One reconciliation pass: update tracked nodes in place, materialize
    /// new records, and destroy nodes whose records disappeared.
    pub fn run_pass(
        &mut self,
        snapshot: &Snapshot,
        graph: &mut SceneGraph,
        materializer: &Materializer<'_>,
    ) -> Result<PassReport> {
        let mut report = PassReport::default();

        if !self.mounted {
            self.mounted = true;
            if self.config.skip_initial_pass {
                report.skipped = true;
                self.adopt_existing(snapshot, graph, &mut report);
                log::info!(
                    "initial pass skipped, adopted {} existing node(s)",
                    report.adopted.len()
                );
                return Ok(report);
            }
        }

        let root = graph.root();
        let previous = std::mem::take(&mut self.top_level);
        self.reconcile_children(
            snapshot,
            snapshot.records(),
            root,
            graph,
            materializer,
            &mut report,
        )?;
        self.top_level = snapshot.records().iter().map(|r| r.id.clone()).collect();

        // Tracked ids that left the store while their node was off the root
        for id in previous {
            if snapshot.contains(id.as_str()) {
                continue;
            }
            if let Some(node) = self.node_for(id.as_str()) {
                self.destroy(node, graph, &mut report)?;
            }
        }

        self.last_revision = Some(snapshot.revision());
        log::info!(
            "pass @{}: {} attached, {} reattached, {} updated, {} detached",
            snapshot.revision(),
            report.attached.len(),
            report.reattached.len(),
            report.updated.len(),
            report.detached.len()
        );
        Ok(report)
    }

    /// Bind tagged nodes already under the root whose ids the store knows
    fn adopt_existing(
        &mut self,
        snapshot: &Snapshot,
        graph: &SceneGraph,
        report: &mut PassReport,
    ) {
        let root = graph.root();
        for &child in graph.children(root) {
            let Some(tag) = graph.tag(child) else {
                continue;
            };
            let is_top_level = snapshot.records().iter().any(|r| r.id == tag.id);
            if !is_top_level || self.is_bound(tag.id.as_str()) {
                continue;
            }
            self.bind_subtree(child, graph);
            self.top_level.push(tag.id.clone());
            report.adopted.push(tag.id);
        }
    }

    /// Make the bound children of `parent` match `records`, in three steps:
    /// sweep nodes whose records left this parent, reattach or update nodes
    /// that are still tracked, and materialize the rest.
    fn reconcile_children(
        &mut self,
        snapshot: &Snapshot,
        records: &[Record],
        parent: NodeHandle,
        graph: &mut SceneGraph,
        materializer: &Materializer<'_>,
        report: &mut PassReport,
    ) -> Result<()> {
        let stale: Vec<(NodeHandle, RecordId)> = graph
            .children(parent)
            .iter()
            .filter_map(|&c| self.id_for(c).map(|id| (c, id.clone())))
            .filter(|(_, id)| records.iter().all(|r| &r.id != id))
            .collect();
        for (node, id) in stale {
            if snapshot.contains(id.as_str()) {
                // Moved elsewhere in the hierarchy; picked up when its new
                // parent is walked
                graph.detach(node)?;
            } else {
                self.destroy(node, graph, report)?;
            }
        }

        for record in records {
            match self.live_node(&record.id, graph) {
                Some(node) => {
                    if !self.is_placed(node, parent, graph) {
                        graph.attach(parent, node)?;
                        log::trace!("reattached '{}'", record.id);
                        report.reattached.push(record.id.clone());
                    }
                    self.update_subtree(snapshot, record, node, graph, materializer, report)?;
                }
                None => {
                    let node = self.materialize_into(record, parent, graph, materializer, report)?;
                    log::trace!("attached '{}' as {:?}", record.id, node);
                    // Prototype clones come without the record's children
                    self.reconcile_children(
                        snapshot,
                        record.children(),
                        node,
                        graph,
                        materializer,
                        report,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn update_subtree(
        &mut self,
        snapshot: &Snapshot,
        record: &Record,
        node: NodeHandle,
        graph: &mut SceneGraph,
        materializer: &Materializer<'_>,
        report: &mut PassReport,
    ) -> Result<()> {
        let stored = record.transform();
        if let Some(live) = graph.transform(node) {
            if !live.approx_eq(&stored, TRANSFORM_EPSILON) {
                graph.set_transform(node, stored)?;
                log::trace!("updated '{}' in place", record.id);
                report.updated.push(record.id.clone());
            }
        }
        self.reconcile_children(snapshot, record.children(), node, graph, materializer, report)
    }

    /// Top-level nodes sit directly under the root. Nested nodes may sit
    /// deeper inside their container, but only below untracked nodes such as
    /// prototype parts.
    fn is_placed(&self, node: NodeHandle, parent: NodeHandle, graph: &SceneGraph) -> bool {
        let root = graph.root();
        let mut current = graph.parent(node);
        while let Some(ancestor) = current {
            if ancestor == parent {
                return true;
            }
            if parent == root || ancestor == root || self.id_for(ancestor).is_some() {
                return false;
            }
            current = graph.parent(ancestor);
        }
        false
    }

    fn materialize_into(
        &mut self,
        record: &Record,
        parent: NodeHandle,
        graph: &mut SceneGraph,
        materializer: &Materializer<'_>,
        report: &mut PassReport,
    ) -> Result<NodeHandle> {
        let out = materializer.materialize(graph, record)?;
        graph.attach(parent, out.node)?;
        self.retire_superseded(out.node, graph)?;
        self.bind_subtree(out.node, graph);
        report.attached.push(record.id.clone());
        report.diagnostics.extend(out.diagnostics);
        Ok(out.node)
    }

    /// Destroy older nodes still bound to ids the fresh subtree now covers
    fn retire_superseded(&mut self, fresh: NodeHandle, graph: &mut SceneGraph) -> Result<()> {
        let covered: Vec<NodeHandle> = std::iter::once(fresh)
            .chain(graph.descendants(fresh))
            .collect();
        for handle in covered {
            let Some(tag) = graph.tag(handle) else {
                continue;
            };
            let Some(old) = self.node_for(tag.id.as_str()) else {
                continue;
            };
            if old == handle
                || !graph.contains(old)
                || graph.ancestors(old).contains(&fresh)
                || graph.ancestors(fresh).contains(&old)
            {
                continue;
            }
            log::debug!("'{}' rebuilt, dropping its previous node", tag.id);
            self.unbind_subtree(old, graph);
            graph.despawn(old)?;
        }
        Ok(())
    }

    fn destroy(
        &mut self,
        node: NodeHandle,
        graph: &mut SceneGraph,
        report: &mut PassReport,
    ) -> Result<()> {
        if let Some(id) = self.id_for(node) {
            report.detached.push(id.clone());
        }
        self.unbind_subtree(node, graph);
        if graph.contains(node) {
            graph.despawn(node)?;
        }
        Ok(())
    }

    /// Node bound to `id`, provided it is still alive
    fn live_node(&mut self, id: &RecordId, graph: &SceneGraph) -> Option<NodeHandle> {
        let node = self.node_for(id.as_str())?;
        if graph.contains(node) {
            Some(node)
        } else {
            log::debug!("node for '{}' vanished, rebinding", id);
            self.bindings.remove_by_left(id.as_str());
            None
        }
    }

    fn bind_subtree(&mut self, node: NodeHandle, graph: &SceneGraph) {
        for handle in std::iter::once(node).chain(graph.descendants(node)) {
            if let Some(tag) = graph.tag(handle) {
                self.bindings.insert(tag.id, handle);
            }
        }
    }

    fn unbind_subtree(&mut self, node: NodeHandle, graph: &SceneGraph) {
        for handle in std::iter::once(node).chain(graph.descendants(node)) {
            self.bindings.remove_by_right(&handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{Transform, Vec3};
    use atelier_scene::{MeshPart, NodeKind, NodeTag, ResourceRegistry};
    use atelier_store::{MemoryStore, RecordStore, TransformPatch};

    fn eager() -> SceneSync {
        SceneSync::new(SyncConfig {
            skip_initial_pass: false,
        })
    }

    fn seeded() -> MemoryStore {
        MemoryStore::from_records(vec![
            Record::mesh("a", "A"),
            Record::group("g", "G")
                .with_child(Record::mesh("m", "M").with_position(Vec3::new(0.0, 1.0, 0.0))),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_pass_attaches_everything() {
        let store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();

        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert!(!report.skipped);
        assert_eq!(report.attached, vec![RecordId::from("a"), RecordId::from("g")]);
        assert_eq!(sync.tracked_count(), 2);
        assert_eq!(sync.bound_count(), 3);
        let m = sync.node_for("m").unwrap();
        assert!(graph.is_in_tree(m));
        assert_eq!(graph.parent(m), sync.node_for("g"));
        assert_eq!(sync.id_for(m), Some(&RecordId::from("m")));
    }

    #[test]
    fn test_identity_preserved_across_transform_passes() {
        let mut store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let a = sync.node_for("a").unwrap();
        let m = sync.node_for("m").unwrap();
        let count = graph.node_count();

        for step in 1..=5 {
            let x = step as f32;
            store
                .update("a", &TransformPatch::position(Vec3::new(x, 0.0, 0.0)))
                .unwrap();
            store
                .update("m", &TransformPatch::position(Vec3::new(0.0, x, 0.0)))
                .unwrap();
            let report = sync
                .run_pass(&store.read_all(), &mut graph, &materializer)
                .unwrap();
            assert!(report.attached.is_empty());
            assert_eq!(report.updated, vec![RecordId::from("a"), RecordId::from("m")]);
        }

        assert_eq!(sync.node_for("a"), Some(a));
        assert_eq!(sync.node_for("m"), Some(m));
        assert_eq!(graph.node_count(), count);
        assert_eq!(
            graph.transform(a).unwrap().position,
            Vec3::new(5.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_unchanged_pass_is_noop() {
        let store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        let snapshot = store.read_all();

        sync.run_pass(&snapshot, &mut graph, &materializer).unwrap();
        assert!(sync
            .run_pass(&snapshot, &mut graph, &materializer)
            .unwrap()
            .is_noop());
        assert!(sync
            .sync_if_changed(&snapshot, &mut graph, &materializer)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_removed_record_is_destroyed() {
        let mut store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let g = sync.node_for("g").unwrap();
        let m = sync.node_for("m").unwrap();

        store.remove("g").unwrap();
        let report = sync
            .sync_if_changed(&store.read_all(), &mut graph, &materializer)
            .unwrap()
            .unwrap();

        assert_eq!(report.detached, vec![RecordId::from("g")]);
        assert!(!graph.contains(g));
        assert!(!graph.contains(m));
        assert!(!sync.is_bound("g"));
        assert!(!sync.is_bound("m"));
        assert_eq!(sync.tracked_count(), 1);
        assert_eq!(graph.children(graph.root()).len(), 1);
    }

    #[test]
    fn test_skipped_first_pass_adopts_existing_nodes() {
        let store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let root = graph.root();

        // Engine already shows "a" from a previous session
        let existing = graph.spawn_mesh(MeshPart::default());
        graph
            .set_tag(existing, NodeTag::for_record(RecordId::from("a"), "A"))
            .unwrap();
        graph.attach(root, existing).unwrap();

        let mut sync = SceneSync::default();
        let snapshot = store.read_all();
        let first = sync
            .sync_if_changed(&snapshot, &mut graph, &materializer)
            .unwrap()
            .unwrap();
        assert!(first.skipped);
        assert_eq!(first.adopted, vec![RecordId::from("a")]);
        assert!(first.attached.is_empty());
        assert_eq!(sync.last_revision(), None);

        let second = sync
            .sync_if_changed(&snapshot, &mut graph, &materializer)
            .unwrap()
            .unwrap();
        assert_eq!(second.attached, vec![RecordId::from("g")]);
        assert_eq!(sync.node_for("a"), Some(existing));
        assert_eq!(graph.children(root).len(), 2);
    }

    #[test]
    fn test_nested_child_added_and_removed() {
        let mut store = MemoryStore::from_records(vec![
            Record::group("g", "G").with_child(Record::mesh("m1", "M1"))
        ])
        .unwrap();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let g = sync.node_for("g").unwrap();
        let m1 = sync.node_for("m1").unwrap();

        store.remove("g").unwrap();
        store
            .add(Record::group("g", "G").with_child(Record::mesh("m2", "M2")))
            .unwrap();
        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert_eq!(sync.node_for("g"), Some(g));
        assert_eq!(report.attached, vec![RecordId::from("m2")]);
        assert_eq!(report.detached, vec![RecordId::from("m1")]);
        assert!(!graph.contains(m1));
        assert_eq!(graph.children(g), &[sync.node_for("m2").unwrap()]);
    }

    #[test]
    fn test_externally_despawned_node_is_rebuilt() {
        let store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let a = sync.node_for("a").unwrap();
        graph.despawn(a).unwrap();

        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();
        assert_eq!(report.attached, vec![RecordId::from("a")]);
        assert_eq!(sync.tracked_count(), 2);
        let rebuilt = sync.node_for("a").unwrap();
        assert!(graph.is_in_tree(rebuilt));
        assert_eq!(graph.transform(rebuilt), Some(Transform::IDENTITY));
    }

    #[test]
    fn test_record_moved_between_nesting_levels() {
        let mut store = MemoryStore::from_records(vec![Record::group("g", "G")
            .with_child(Record::mesh("m", "M").with_position(Vec3::new(0.0, 1.0, 0.0)))])
        .unwrap();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let g = sync.node_for("g").unwrap();
        let m = sync.node_for("m").unwrap();

        // Out of the container, to top level
        store.remove("g").unwrap();
        store.add(Record::mesh("m", "M")).unwrap();
        store.add(Record::group("g", "G")).unwrap();
        let report = sync
            .sync_if_changed(&store.read_all(), &mut graph, &materializer)
            .unwrap()
            .unwrap();

        assert_eq!(report.reattached, vec![RecordId::from("m")]);
        assert_eq!(report.updated, vec![RecordId::from("m")]);
        assert!(report.attached.is_empty());
        assert!(report.detached.is_empty());
        assert_eq!(sync.node_for("m"), Some(m));
        assert_eq!(graph.parent(m), Some(graph.root()));
        assert!(graph.children(g).is_empty());
        assert_eq!(sync.tracked_count(), 2);

        // And back inside
        store.remove("m").unwrap();
        store.remove("g").unwrap();
        store
            .add(Record::group("g", "G").with_child(Record::mesh("m", "M")))
            .unwrap();
        let report = sync
            .sync_if_changed(&store.read_all(), &mut graph, &materializer)
            .unwrap()
            .unwrap();

        assert_eq!(report.reattached, vec![RecordId::from("m")]);
        assert!(report.detached.is_empty());
        assert_eq!(sync.node_for("m"), Some(m));
        assert_eq!(graph.parent(m), Some(g));
        assert!(graph.is_in_tree(m));
        assert_eq!(sync.top_level_ids(), &[RecordId::from("g")]);
    }

    #[test]
    fn test_record_moved_up_within_container() {
        let mut store = MemoryStore::from_records(vec![Record::group("g", "G")
            .with_child(Record::group("h", "H").with_child(Record::mesh("m", "M")))])
        .unwrap();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let g = sync.node_for("g").unwrap();
        let h = sync.node_for("h").unwrap();
        let m = sync.node_for("m").unwrap();

        store.remove("g").unwrap();
        store
            .add(
                Record::group("g", "G")
                    .with_child(Record::mesh("m", "M"))
                    .with_child(Record::group("h", "H")),
            )
            .unwrap();
        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert_eq!(report.reattached, vec![RecordId::from("m")]);
        assert_eq!(graph.parent(m), Some(g));
        assert!(graph.children(h).is_empty());
        assert_eq!(sync.node_for("h"), Some(h));
    }

    #[test]
    fn test_record_moved_into_new_container() {
        let mut store = MemoryStore::from_records(vec![Record::mesh("a", "A")]).unwrap();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let old = sync.node_for("a").unwrap();

        store.remove("a").unwrap();
        store
            .add(Record::group("g", "G").with_child(Record::mesh("a", "A")))
            .unwrap();
        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert_eq!(report.attached, vec![RecordId::from("g")]);
        assert!(!graph.contains(old));
        let a = sync.node_for("a").unwrap();
        assert!(graph.is_in_tree(a));
        assert_eq!(graph.parent(a), sync.node_for("g"));
        assert_eq!(graph.children(graph.root()).len(), 1);
    }

    #[test]
    fn test_externally_detached_node_is_reattached() {
        let mut store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let a = sync.node_for("a").unwrap();
        graph.detach(a).unwrap();
        assert!(!graph.is_in_tree(a));

        store.add(Record::mesh("b", "B")).unwrap();
        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert_eq!(report.reattached, vec![RecordId::from("a")]);
        assert_eq!(report.attached, vec![RecordId::from("b")]);
        assert_eq!(sync.node_for("a"), Some(a));
        assert!(graph.is_in_tree(a));
        assert_eq!(graph.parent(a), Some(graph.root()));
    }

    #[test]
    fn test_detached_node_removed_from_store_is_destroyed() {
        let mut store = seeded();
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();
        let mut sync = eager();
        sync.run_pass(&store.read_all(), &mut graph, &materializer).unwrap();
        let a = sync.node_for("a").unwrap();
        graph.detach(a).unwrap();

        store.remove("a").unwrap();
        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert_eq!(report.detached, vec![RecordId::from("a")]);
        assert!(!graph.contains(a));
        assert!(!sync.is_bound("a"));
    }

    #[test]
    fn test_prototype_container_gets_child_records() {
        let store = MemoryStore::from_records(vec![
            Record::group("g", "G").with_child(Record::mesh("m", "M"))
        ])
        .unwrap();
        let mut graph = SceneGraph::new();
        let prototype = graph.spawn(NodeKind::Group);
        let part = graph.spawn_mesh(MeshPart::default());
        graph.attach(prototype, part).unwrap();
        let mut resources = ResourceRegistry::new();
        resources.register_prototype("g", prototype);
        let materializer = Materializer::new(&resources);
        let mut sync = eager();

        let report = sync
            .run_pass(&store.read_all(), &mut graph, &materializer)
            .unwrap();

        assert_eq!(report.attached, vec![RecordId::from("g"), RecordId::from("m")]);
        assert!(report
            .diagnostics
            .contains(&Diagnostic::IdentityCoercionFailure {
                id: RecordId::from("g")
            }));
        let g = sync.node_for("g").unwrap();
        let m = sync.node_for("m").unwrap();
        assert_ne!(g, prototype);
        assert!(graph.is_in_tree(m));
        assert_eq!(graph.parent(m), Some(g));
        assert_eq!(graph.children(g).len(), 2);

        assert!(sync
            .sync_if_changed(&store.read_all(), &mut graph, &materializer)
            .unwrap()
            .is_none());
    }
}
