//! Shared load-and-mount harness for commands

use anyhow::{Context, Result};
use atelier_editor::EditorConfig;
use atelier_scene::{Materializer, NodeHandle, ResourceRegistry, SceneGraph};
use atelier_store::{load_records, MemoryStore, RecordStore};
use atelier_sync::{PassReport, SceneSync};

/// A records file loaded into a store and mounted into a render tree
pub struct Session {
    pub store: MemoryStore,
    pub resources: ResourceRegistry,
    pub graph: SceneGraph,
    pub sync: SceneSync,
}

impl Session {
    pub fn open(records_path: &str, config: &EditorConfig) -> Result<Self> {
        let store = load_records(records_path)
            .with_context(|| format!("Failed to load records: {}", records_path))?;

        let mut session = Self {
            store,
            resources: ResourceRegistry::new(),
            graph: SceneGraph::with_identity_policy(config.identity_policy()),
            sync: SceneSync::new(config.sync_config()),
        };

        // An empty engine tree has nothing to adopt, so mount runs until a
        // pass actually reconciles
        session.pass()?;
        if session.sync.last_revision().is_none() {
            session.pass()?;
        }
        Ok(session)
    }

    /// Reconcile the render tree with the store if it changed
    pub fn pass(&mut self) -> Result<Option<PassReport>> {
        let snapshot = self.store.read_all();
        let materializer = Materializer::new(&self.resources);
        let report = self
            .sync
            .sync_if_changed(&snapshot, &mut self.graph, &materializer)
            .context("Reconciliation pass failed")?;

        if let Some(report) = &report {
            for diagnostic in &report.diagnostics {
                log::warn!("{}", diagnostic);
            }
        }
        Ok(report)
    }

    pub fn node(&self, id: &str) -> Result<NodeHandle> {
        self.sync
            .node_for(id)
            .with_context(|| format!("Record '{}' is not in the render tree", id))
    }
}
