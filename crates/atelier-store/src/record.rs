//! Record definitions

use atelier_core::{AtelierError, RecordId, Transform, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which kind of scene entity a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Mesh,
    Group,
    GenericNode,
}

impl RecordKind {
    pub fn is_container(&self) -> bool {
        !matches!(self, RecordKind::Mesh)
    }
}

/// Geometry descriptor: primitive parameters or a reference to a registered fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeometryDesc {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
    Plane { width: f32, depth: f32 },
    Reference { id: String },
}

/// Material descriptor. Only solid colors are described here; richer
/// materials arrive as registered fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MaterialDesc {
    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
        }
    }
}

/// Kind-specific payload of a record.
///
/// Meshes carry geometry and material; containers carry ordered children.
/// A mesh with children is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    Mesh {
        geometry: Option<GeometryDesc>,
        material: MaterialDesc,
    },
    Group {
        children: Vec<Record>,
    },
    GenericNode {
        children: Vec<Record>,
    },
}

/// A persisted, serializable description of one scene entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub position: Vec3,
    /// Rotation in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Free-form key/value metadata; never interpreted by the editing core
    pub tags: BTreeMap<String, String>,
    pub body: RecordBody,
}

/// A partial transform update. Only the fields present are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
}

impl TransformPatch {
    /// A patch carrying every field of `transform`
    pub fn full(transform: &Transform) -> Self {
        Self {
            position: Some(transform.position),
            rotation: Some(transform.rotation),
            scale: Some(transform.scale),
        }
    }

    pub fn position(position: Vec3) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

impl Record {
    fn with_body(id: impl Into<RecordId>, name: impl Into<String>, body: RecordBody) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            tags: BTreeMap::new(),
            body,
        }
    }

    pub fn mesh(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self::with_body(
            id,
            name,
            RecordBody::Mesh {
                geometry: None,
                material: MaterialDesc::default(),
            },
        )
    }

    pub fn group(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self::with_body(id, name, RecordBody::Group { children: Vec::new() })
    }

    pub fn generic(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self::with_body(id, name, RecordBody::GenericNode { children: Vec::new() })
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Set the geometry descriptor. Ignored for containers.
    pub fn with_geometry(mut self, desc: GeometryDesc) -> Self {
        if let RecordBody::Mesh { geometry, .. } = &mut self.body {
            *geometry = Some(desc);
        }
        self
    }

    /// Set the material descriptor. Ignored for containers.
    pub fn with_material(mut self, desc: MaterialDesc) -> Self {
        if let RecordBody::Mesh { material, .. } = &mut self.body {
            *material = desc;
        }
        self
    }

    /// Append a child. Ignored for meshes, which cannot have children.
    pub fn with_child(mut self, child: Record) -> Self {
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
        self
    }

    pub fn kind(&self) -> RecordKind {
        match self.body {
            RecordBody::Mesh { .. } => RecordKind::Mesh,
            RecordBody::Group { .. } => RecordKind::Group,
            RecordBody::GenericNode { .. } => RecordKind::GenericNode,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.scale)
    }

    pub fn children(&self) -> &[Record] {
        match &self.body {
            RecordBody::Mesh { .. } => &[],
            RecordBody::Group { children } | RecordBody::GenericNode { children } => children,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Record>> {
        match &mut self.body {
            RecordBody::Mesh { .. } => None,
            RecordBody::Group { children } | RecordBody::GenericNode { children } => {
                Some(children)
            }
        }
    }

    /// Find this record or a descendant by id
    pub fn find(&self, id: &str) -> Option<&Record> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Find this record or a descendant by id, mutably
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Record> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Visit this record and every descendant, depth-first in child order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Record)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Merge the fields present in `patch`. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &TransformPatch) -> bool {
        let before = self.transform();
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
        before != self.transform()
    }
}

/// Flat on-disk shape of a record, validated on conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRecord {
    id: RecordId,
    kind: RecordKind,
    #[serde(default)]
    name: String,
    #[serde(default)]
    position: Vec3,
    #[serde(default)]
    rotation: Vec3,
    #[serde(default = "default_scale")]
    scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geometry: Option<GeometryDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    material: Option<MaterialDesc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Record>,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl TryFrom<RawRecord> for Record {
    type Error = AtelierError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let body = match raw.kind {
            RecordKind::Mesh => {
                if !raw.children.is_empty() {
                    return Err(AtelierError::InvalidRecord {
                        id: raw.id.to_string(),
                        reason: "mesh records cannot have children".to_string(),
                    });
                }
                RecordBody::Mesh {
                    geometry: raw.geometry,
                    material: raw.material.unwrap_or_default(),
                }
            }
            RecordKind::Group => RecordBody::Group {
                children: raw.children,
            },
            RecordKind::GenericNode => RecordBody::GenericNode {
                children: raw.children,
            },
        };

        Ok(Record {
            id: raw.id,
            name: raw.name,
            position: raw.position,
            rotation: raw.rotation,
            scale: raw.scale,
            tags: raw.tags,
            body,
        })
    }
}

impl From<Record> for RawRecord {
    fn from(record: Record) -> Self {
        let kind = record.kind();
        let (geometry, material, children) = match record.body {
            RecordBody::Mesh { geometry, material } => (geometry, Some(material), Vec::new()),
            RecordBody::Group { children } | RecordBody::GenericNode { children } => {
                (None, None, children)
            }
        };

        RawRecord {
            id: record.id,
            kind,
            name: record.name,
            position: record.position,
            rotation: record.rotation,
            scale: record.scale,
            geometry,
            material,
            tags: record.tags,
            children,
        }
    }
}
