//! Reusable native resources registered by external creation flows

use crate::node::{Geometry, Material, NodeHandle};
use atelier_core::RecordId;
use std::collections::HashMap;

/// Prototypes and resource fragments keyed by record id or derived id.
///
/// Populated by creation flows (importers, generators) before the record
/// reaches the store. The editing core only reads it.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    prototypes: HashMap<RecordId, NodeHandle>,
    geometries: HashMap<String, Geometry>,
    materials: HashMap<String, Material>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detached node as the prototype for `id`
    pub fn register_prototype(&mut self, id: impl Into<RecordId>, node: NodeHandle) {
        self.prototypes.insert(id.into(), node);
    }

    /// Register a geometry fragment under a record-derived or shared id
    pub fn register_geometry(&mut self, key: impl Into<String>, geometry: Geometry) {
        self.geometries.insert(key.into(), geometry);
    }

    /// Register a material fragment under a record-derived or shared id
    pub fn register_material(&mut self, key: impl Into<String>, material: Material) {
        self.materials.insert(key.into(), material);
    }

    pub fn prototype(&self, id: &str) -> Option<NodeHandle> {
        self.prototypes.get(id).copied()
    }

    pub fn geometry(&self, key: &str) -> Option<Geometry> {
        self.geometries.get(key).copied()
    }

    pub fn material(&self, key: &str) -> Option<Material> {
        self.materials.get(key).copied()
    }

    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }
}
