//! Atelier Scene - the live render tree
//!
//! This crate wraps hecs with an ordered node hierarchy, converts stored
//! records into live nodes, and hit-tests the tree for viewport picking.

mod camera;
mod diagnostics;
mod graph;
mod materializer;
mod node;
mod picking;
mod resources;

pub use camera::Camera;
pub use diagnostics::{Diagnostic, ResourceKind};
pub use graph::SceneGraph;
pub use materializer::{Materialized, Materializer, GEOMETRY_FRAGMENT, MATERIAL_FRAGMENT};
pub use node::{
    Geometry, IdentityPolicy, Material, MeshPart, NodeHandle, NodeIdentity, NodeKind, NodeTag,
    Primitive,
};
pub use picking::{pick_node, ray_intersect, world_bounds, Aabb, Ray};
pub use resources::ResourceRegistry;
