//! Live node components and handles

use atelier_core::{Color, RecordId, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Handle to a node in the live render tree.
///
/// Handles are engine-native and may be recycled after a node is despawned;
/// the stable link to persisted data is the [`NodeTag`] id.
#[derive(Clone, Copy, Hash, Eq, PartialEq)]
pub struct NodeHandle(pub(crate) hecs::Entity);

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.0.id())
    }
}

/// Structural role of a live node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The render root; never selectable, never despawned
    Root,
    Mesh,
    Group,
    Generic,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Mesh => "mesh",
            NodeKind::Group => "group",
            NodeKind::Generic => "node",
        }
    }
}

/// Fixed metadata identifying a node to the editing core.
///
/// Stamped once at materialization. Nodes without a tag (helpers, engine
/// internals, untagged prototype parts) are never selected directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTag {
    pub id: RecordId,
    pub name: String,
    pub is_user_created: bool,
    pub is_serialized_from_code: bool,
}

impl NodeTag {
    /// Tag for a node materialized from a stored record
    pub fn for_record(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_user_created: true,
            is_serialized_from_code: true,
        }
    }

    /// Whether the tag marks an editable entity
    pub fn is_editable(&self) -> bool {
        self.is_user_created || self.is_serialized_from_code
    }
}

/// Engine-native identity of a node.
///
/// Every node gets a fresh uuid at spawn. The engine may additionally let a
/// caller assign a name-like identity; whether that is permitted depends on
/// the graph's [`IdentityPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub uuid: Uuid,
    pub assigned: Option<String>,
    pub reserved: bool,
}

impl NodeIdentity {
    pub(crate) fn fresh(reserved: bool) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            assigned: None,
            reserved,
        }
    }
}

/// Whether the render engine lets callers overwrite node identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    #[default]
    Mutable,
    Reserved,
}

/// Primitive shape of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    Plane { width: f32, depth: f32 },
    /// Opaque engine geometry known only by its local bounds
    Custom { min: Vec3, max: Vec3 },
}

/// Geometry attached to a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub primitive: Primitive,
}

impl Geometry {
    pub fn new(primitive: Primitive) -> Self {
        Self { primitive }
    }

    /// The default placeholder geometry
    pub fn unit_cube() -> Self {
        Self::new(Primitive::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        })
    }

    /// Local-space bounds as (min, max), centered on the origin for primitives
    pub fn local_bounds(&self) -> (Vec3, Vec3) {
        match self.primitive {
            Primitive::Box {
                width,
                height,
                depth,
            } => {
                let half = Vec3::new(width * 0.5, height * 0.5, depth * 0.5);
                (Vec3::ZERO - half, half)
            }
            Primitive::Sphere { radius } => (
                Vec3::new(-radius, -radius, -radius),
                Vec3::new(radius, radius, radius),
            ),
            Primitive::Plane { width, depth } => (
                Vec3::new(-width * 0.5, 0.0, -depth * 0.5),
                Vec3::new(width * 0.5, 0.0, depth * 0.5),
            ),
            Primitive::Custom { min, max } => (min, max),
        }
    }
}

/// Solid-color material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self { color }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid(Color::WHITE)
    }
}

/// Renderable payload of a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPart {
    pub geometry: Geometry,
    pub material: Material,
}

impl MeshPart {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }
}

impl Default for MeshPart {
    fn default() -> Self {
        Self::new(Geometry::unit_cube(), Material::default())
    }
}
