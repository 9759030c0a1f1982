//! Viewport picking via ray-AABB intersection
//!
//! Unprojects screen coordinates through the camera's inverse view-projection
//! matrix and tests against the world-space bounds of mesh nodes.

use crate::camera::{from_glam_vec3, Camera};
use crate::graph::SceneGraph;
use crate::node::NodeHandle;
use atelier_core::Vec3;

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalized();
        Self {
            origin,
            direction: if direction == Vec3::ZERO {
                Vec3::FORWARD
            } else {
                direction
            },
        }
    }

    /// Ray through a pixel. `screen_x`, `screen_y` and the viewport size are
    /// in physical pixels, origin top-left.
    pub fn from_screen(
        screen_x: f32,
        screen_y: f32,
        viewport_width: f32,
        viewport_height: f32,
        camera: &Camera,
    ) -> Self {
        let inv_vp = camera.inverse_view_projection_matrix();

        let ndc_x = 2.0 * screen_x / viewport_width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen_y / viewport_height; // Y flipped

        // OpenGL-style clip depth
        let near = inv_vp.project_point3(glam::Vec3::new(ndc_x, ndc_y, -1.0));
        let far = inv_vp.project_point3(glam::Vec3::new(ndc_x, ndc_y, 1.0));

        Self::new(from_glam_vec3(near), from_glam_vec3(far - near))
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

impl Aabb {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds of this box after a column-major world matrix
    pub fn transformed(&self, mat: &[[f32; 4]; 4]) -> Self {
        let mut new_min = [mat[3][0], mat[3][1], mat[3][2]];
        let mut new_max = new_min;
        let min = self.min.to_array();
        let max = self.max.to_array();

        for i in 0..3 {
            for j in 0..3 {
                let a = mat[i][j] * min[i];
                let b = mat[i][j] * max[i];
                new_min[j] += a.min(b);
                new_max[j] += a.max(b);
            }
        }

        Self {
            min: Vec3::from_array(new_min),
            max: Vec3::from_array(new_max),
        }
    }
}

/// Slab-method ray/box test. Returns the distance to the nearest hit in
/// front of the origin.
pub fn ray_intersect(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let origin = ray.origin.to_array();
    let direction = ray.direction.to_array();
    let min = aabb.min.to_array();
    let max = aabb.max.to_array();

    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for i in 0..3 {
        if direction[i].abs() < 1e-8 {
            // Parallel to this slab
            if origin[i] < min[i] || origin[i] > max[i] {
                return None;
            }
        } else {
            let inv_d = 1.0 / direction[i];
            let mut t1 = (min[i] - origin[i]) * inv_d;
            let mut t2 = (max[i] - origin[i]) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return None;
            }
        }
    }

    if tmax < 0.0 {
        None
    } else {
        Some(tmin.max(0.0))
    }
}

/// World-space bounds of a mesh node
pub fn world_bounds(graph: &SceneGraph, node: NodeHandle) -> Option<Aabb> {
    let mesh = graph.mesh(node)?;
    let world = graph.world_matrix(node)?;
    let (min, max) = mesh.geometry.local_bounds();
    Some(Aabb::from_min_max(min, max).transformed(&world))
}

/// Nearest mesh node in the rendered tree hit by `ray`.
///
/// Detached nodes (prototypes, pending subtrees) are ignored. Ties go to
/// the deeper node.
pub fn pick_node(graph: &SceneGraph, ray: &Ray) -> Option<(NodeHandle, f32)> {
    let mut best: Option<(NodeHandle, f32, usize)> = None;

    for node in graph.mesh_nodes() {
        if !graph.is_in_tree(node) {
            continue;
        }
        let Some(aabb) = world_bounds(graph, node) else {
            continue;
        };
        let Some(dist) = ray_intersect(ray, &aabb) else {
            continue;
        };
        let depth = graph.ancestors(node).len();
        let better = match best {
            None => true,
            Some((_, d, best_depth)) => {
                dist < d - 1e-6 || ((dist - d).abs() <= 1e-6 && depth > best_depth)
            }
        };
        if better {
            best = Some((node, dist, depth));
        }
    }

    best.map(|(node, dist, _)| (node, dist))
}
