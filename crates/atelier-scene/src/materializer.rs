//! Record -> live node materialization

use crate::diagnostics::{Diagnostic, ResourceKind};
use crate::graph::SceneGraph;
use crate::node::{Geometry, Material, MeshPart, NodeHandle, NodeKind, NodeTag, Primitive};
use crate::resources::ResourceRegistry;
use atelier_core::{Color, Result};
use atelier_store::{GeometryDesc, MaterialDesc, Record, RecordBody};

/// Fragment suffixes under which per-record resources are registered
pub const GEOMETRY_FRAGMENT: &str = "geometry";
pub const MATERIAL_FRAGMENT: &str = "material";

/// Result of materializing one record
#[derive(Debug)]
pub struct Materialized {
    /// The new, detached subtree root
    pub node: NodeHandle,
    /// Conditions recovered from along the way
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts records into live render-tree nodes
pub struct Materializer<'r> {
    resources: &'r ResourceRegistry,
}

impl<'r> Materializer<'r> {
    pub fn new(resources: &'r ResourceRegistry) -> Self {
        Self { resources }
    }

    /// Materialize a record and its children as a detached subtree.
    ///
    /// Missing resources never fail the call; defaults are substituted and
    /// reported in the returned diagnostics.
    pub fn materialize(&self, graph: &mut SceneGraph, record: &Record) -> Result<Materialized> {
        let mut diagnostics = Vec::new();
        let node = self.materialize_record(graph, record, &mut diagnostics)?;
        Ok(Materialized { node, diagnostics })
    }

    fn materialize_record(
        &self,
        graph: &mut SceneGraph,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<NodeHandle> {
        let node = match self.clone_prototype(graph, record, diagnostics)? {
            Some(node) => node,
            None => match &record.body {
                RecordBody::Mesh { geometry, material } => {
                    self.materialize_mesh(graph, record, geometry.as_ref(), material, diagnostics)
                }
                RecordBody::Group { children } => {
                    self.materialize_container(graph, NodeKind::Group, children, diagnostics)?
                }
                RecordBody::GenericNode { children } => {
                    self.materialize_container(graph, NodeKind::Generic, children, diagnostics)?
                }
            },
        };

        graph.set_transform(node, record.transform())?;
        graph.set_tag(node, NodeTag::for_record(record.id.clone(), record.name.clone()))?;

        if let Err(err) = graph.try_set_identity(node, record.id.as_str()) {
            log::debug!("identity for '{}' stays engine-owned: {}", record.id, err);
            diagnostics.push(Diagnostic::IdentityCoercionFailure {
                id: record.id.clone(),
            });
        }

        log::trace!("materialized '{}' as {:?}", record.id, node);
        Ok(node)
    }

    fn clone_prototype(
        &self,
        graph: &mut SceneGraph,
        record: &Record,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Option<NodeHandle>> {
        let Some(prototype) = self.resources.prototype(record.id.as_str()) else {
            return Ok(None);
        };

        if !graph.contains(prototype) {
            log::warn!(
                "prototype for '{}' was despawned, rebuilding from record",
                record.id
            );
            diagnostics.push(Diagnostic::MissingResource {
                id: record.id.clone(),
                resource: ResourceKind::Prototype,
            });
            return Ok(None);
        }

        graph.clone_subtree(prototype).map(Some)
    }

    fn materialize_mesh(
        &self,
        graph: &mut SceneGraph,
        record: &Record,
        geometry: Option<&GeometryDesc>,
        material: &MaterialDesc,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> NodeHandle {
        let geometry = self.resolve_geometry(record, geometry, diagnostics);
        let material = self.resolve_material(record, material, diagnostics);
        graph.spawn_mesh(MeshPart::new(geometry, material))
    }

    fn materialize_container(
        &self,
        graph: &mut SceneGraph,
        kind: NodeKind,
        children: &[Record],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<NodeHandle> {
        let container = graph.spawn(kind);
        for child in children {
            let child_node = self.materialize_record(graph, child, diagnostics)?;
            graph.attach(container, child_node)?;
        }
        Ok(container)
    }

    fn resolve_geometry(
        &self,
        record: &Record,
        desc: Option<&GeometryDesc>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Geometry {
        if let Some(fragment) = self
            .resources
            .geometry(&record.id.derived(GEOMETRY_FRAGMENT))
        {
            return fragment;
        }

        let resolved = match desc {
            Some(GeometryDesc::Box {
                width,
                height,
                depth,
            }) => Some(Geometry::new(Primitive::Box {
                width: *width,
                height: *height,
                depth: *depth,
            })),
            Some(GeometryDesc::Sphere { radius }) => {
                Some(Geometry::new(Primitive::Sphere { radius: *radius }))
            }
            Some(GeometryDesc::Plane { width, depth }) => Some(Geometry::new(Primitive::Plane {
                width: *width,
                depth: *depth,
            })),
            Some(GeometryDesc::Reference { id }) => self.resources.geometry(id),
            None => None,
        };

        resolved.unwrap_or_else(|| {
            log::warn!("no geometry for '{}', using unit cube", record.id);
            diagnostics.push(Diagnostic::MissingResource {
                id: record.id.clone(),
                resource: ResourceKind::Geometry,
            });
            Geometry::unit_cube()
        })
    }

    fn resolve_material(
        &self,
        record: &Record,
        desc: &MaterialDesc,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Material {
        if let Some(fragment) = self
            .resources
            .material(&record.id.derived(MATERIAL_FRAGMENT))
        {
            return fragment;
        }

        match desc.color.as_deref().map(|c| (c, Color::parse(c))) {
            Some((_, Some(color))) => Material::solid(color),
            Some((raw, None)) => {
                log::warn!(
                    "cannot decode color '{}' for '{}', using white",
                    raw,
                    record.id
                );
                diagnostics.push(Diagnostic::MissingResource {
                    id: record.id.clone(),
                    resource: ResourceKind::Material,
                });
                Material::default()
            }
            None => {
                log::warn!("no material for '{}', using white", record.id);
                diagnostics.push(Diagnostic::MissingResource {
                    id: record.id.clone(),
                    resource: ResourceKind::Material,
                });
                Material::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::IdentityPolicy;
    use atelier_core::{RecordId, Transform, Vec3, TRANSFORM_EPSILON};

    fn red_cube(id: &str) -> Record {
        Record::mesh(id, "Cube")
            .with_geometry(GeometryDesc::Box {
                width: 1.0,
                height: 1.0,
                depth: 1.0,
            })
            .with_material(MaterialDesc::color("#ff0000"))
    }

    #[test]
    fn test_transform_round_trip() {
        let resources = ResourceRegistry::new();
        let materializer = Materializer::new(&resources);
        let mut graph = SceneGraph::new();

        let triples = [
            (Vec3::ZERO, Vec3::ZERO, Vec3::ONE),
            (
                Vec3::new(1.5, -2.0, 3.25),
                Vec3::new(45.0, 90.0, -30.0),
                Vec3::new(2.0, 0.5, 1.0),
            ),
            (
                Vec3::new(-100.0, 0.001, 7.0),
                Vec3::new(0.0, 359.0, 180.0),
                Vec3::new(0.01, 10.0, 3.0),
            ),
        ];

        for (i, (position, rotation, scale)) in triples.into_iter().enumerate() {
            let record = red_cube(&format!("cube-{}", i))
                .with_position(position)
                .with_rotation(rotation)
                .with_scale(scale);
            let out = materializer.materialize(&mut graph, &record).unwrap();
            let live = graph.transform(out.node).unwrap();
            assert!(
                live.approx_eq(&Transform::new(position, rotation, scale), TRANSFORM_EPSILON),
                "round trip failed for {:?}",
                record.id
            );
        }
    }

    #[test]
    fn test_mesh_stamps_tag_and_identity() {
        let resources = ResourceRegistry::new();
        let mut graph = SceneGraph::new();
        let out = Materializer::new(&resources)
            .materialize(&mut graph, &red_cube("a"))
            .unwrap();

        let tag = graph.tag(out.node).unwrap();
        assert_eq!(tag.id, RecordId::from("a"));
        assert_eq!(tag.name, "Cube");
        assert!(tag.is_user_created && tag.is_serialized_from_code);
        assert_eq!(
            graph.identity(out.node).and_then(|i| i.assigned),
            Some("a".to_string())
        );
        assert_eq!(graph.mesh(out.node).unwrap().material.color, Color::RED);
        assert!(out.diagnostics.is_empty());
        assert!(!graph.is_in_tree(out.node));
    }

    #[test]
    fn test_missing_resources_fall_back_to_defaults() {
        let resources = ResourceRegistry::new();
        let mut graph = SceneGraph::new();
        let record = Record::mesh("bare", "Bare")
            .with_geometry(GeometryDesc::Reference {
                id: "imported/chair".to_string(),
            })
            .with_material(MaterialDesc::color("chartreuse-ish"));

        let out = Materializer::new(&resources)
            .materialize(&mut graph, &record)
            .unwrap();

        let mesh = graph.mesh(out.node).unwrap();
        assert_eq!(mesh.geometry, Geometry::unit_cube());
        assert_eq!(mesh.material.color, Color::WHITE);
        assert_eq!(
            out.diagnostics,
            vec![
                Diagnostic::MissingResource {
                    id: RecordId::from("bare"),
                    resource: ResourceKind::Geometry
                },
                Diagnostic::MissingResource {
                    id: RecordId::from("bare"),
                    resource: ResourceKind::Material
                },
            ]
        );
    }

    #[test]
    fn test_registered_fragments_win() {
        let mut resources = ResourceRegistry::new();
        let sphere = Geometry::new(Primitive::Sphere { radius: 2.0 });
        resources.register_geometry("a/geometry", sphere);
        resources.register_material("a/material", Material::solid(Color::BLUE));
        resources.register_geometry(
            "imported/chair",
            Geometry::new(Primitive::Custom {
                min: Vec3::ZERO,
                max: Vec3::ONE,
            }),
        );

        let mut graph = SceneGraph::new();
        let materializer = Materializer::new(&resources);

        let a = materializer.materialize(&mut graph, &red_cube("a")).unwrap();
        let mesh = graph.mesh(a.node).unwrap();
        assert_eq!(mesh.geometry, sphere);
        assert_eq!(mesh.material.color, Color::BLUE);

        let chair = Record::mesh("chair", "Chair")
            .with_geometry(GeometryDesc::Reference {
                id: "imported/chair".to_string(),
            })
            .with_material(MaterialDesc::color("#00ff00"));
        let c = materializer.materialize(&mut graph, &chair).unwrap();
        assert!(matches!(
            graph.mesh(c.node).unwrap().geometry.primitive,
            Primitive::Custom { .. }
        ));
        assert!(c.diagnostics.is_empty());
    }

    #[test]
    fn test_containers_recurse_in_order() {
        let resources = ResourceRegistry::new();
        let mut graph = SceneGraph::new();
        let record = Record::group("g", "Group")
            .with_child(red_cube("first"))
            .with_child(
                Record::generic("pivot", "Pivot")
                    .with_position(Vec3::new(0.0, 1.0, 0.0))
                    .with_child(red_cube("nested")),
            )
            .with_child(red_cube("last"));

        let out = Materializer::new(&resources)
            .materialize(&mut graph, &record)
            .unwrap();

        assert_eq!(graph.kind(out.node), Some(NodeKind::Group));
        let children = graph.children(out.node).to_vec();
        let ids: Vec<String> = children
            .iter()
            .map(|c| graph.tag(*c).unwrap().id.to_string())
            .collect();
        assert_eq!(ids, vec!["first", "pivot", "last"]);

        let pivot = children[1];
        assert_eq!(graph.kind(pivot), Some(NodeKind::Generic));
        assert_eq!(
            graph.transform(pivot).unwrap().position,
            Vec3::new(0.0, 1.0, 0.0)
        );
        let nested = graph.children(pivot)[0];
        assert_eq!(graph.tag(nested).unwrap().id, RecordId::from("nested"));
    }

    #[test]
    fn test_prototype_is_cloned() {
        let mut graph = SceneGraph::new();
        let prototype = graph.spawn(NodeKind::Group);
        let part = graph.spawn_mesh(MeshPart::new(
            Geometry::new(Primitive::Sphere { radius: 0.5 }),
            Material::solid(Color::GREEN),
        ));
        graph.attach(prototype, part).unwrap();

        let mut resources = ResourceRegistry::new();
        resources.register_prototype("tree", prototype);

        let record = Record::group("tree", "Tree").with_position(Vec3::new(4.0, 0.0, 4.0));
        let out = Materializer::new(&resources)
            .materialize(&mut graph, &record)
            .unwrap();

        assert_ne!(out.node, prototype);
        assert_eq!(graph.children(out.node).len(), 1);
        assert_eq!(
            graph.transform(out.node).unwrap().position,
            Vec3::new(4.0, 0.0, 4.0)
        );
        assert_eq!(graph.tag(out.node).unwrap().id, RecordId::from("tree"));
        // The untagged prototype part stays untagged
        assert!(graph.tag(graph.children(out.node)[0]).is_none());
        // Prototype itself is untouched
        assert_eq!(graph.transform(prototype), Some(Transform::IDENTITY));
        // Clones keep engine identities; the tag still carries the record id
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::IdentityCoercionFailure {
                id: RecordId::from("tree")
            }]
        );
    }

    #[test]
    fn test_despawned_prototype_falls_back() {
        let mut graph = SceneGraph::new();
        let prototype = graph.spawn(NodeKind::Group);
        let mut resources = ResourceRegistry::new();
        resources.register_prototype("ghost", prototype);
        graph.despawn(prototype).unwrap();

        let out = Materializer::new(&resources)
            .materialize(&mut graph, &red_cube("ghost"))
            .unwrap();

        assert!(graph.mesh(out.node).is_some());
        assert!(out.diagnostics.contains(&Diagnostic::MissingResource {
            id: RecordId::from("ghost"),
            resource: ResourceKind::Prototype
        }));
    }

    #[test]
    fn test_reserved_identity_degrades() {
        let resources = ResourceRegistry::new();
        let mut graph = SceneGraph::with_identity_policy(IdentityPolicy::Reserved);
        let out = Materializer::new(&resources)
            .materialize(&mut graph, &red_cube("a"))
            .unwrap();

        assert_eq!(graph.identity(out.node).and_then(|i| i.assigned), None);
        assert_eq!(graph.tag(out.node).unwrap().id, RecordId::from("a"));
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::IdentityCoercionFailure {
                id: RecordId::from("a")
            }]
        );
    }
}
