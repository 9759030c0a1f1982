//! SceneGraph - the live render tree

use crate::node::{IdentityPolicy, MeshPart, NodeHandle, NodeIdentity, NodeKind, NodeTag};
use atelier_core::{mat4_mul, AtelierError, Result, Transform};
use std::collections::HashMap;

/// The live, mutable render tree
///
/// Wraps hecs::World with:
/// - A permanent render root
/// - Ordered parent/child links
/// - Typed node components (kind, transform, tag, mesh, identity)
///
/// Nodes can exist detached from the root (freshly materialized subtrees,
/// registered prototypes). Only nodes whose ancestor chain ends at the root
/// are part of the rendered scene.
pub struct SceneGraph {
    world: hecs::World,
    root: NodeHandle,
    /// Parent relationships: child -> parent
    parents: HashMap<NodeHandle, NodeHandle>,
    /// Ordered children: parent -> children
    children: HashMap<NodeHandle, Vec<NodeHandle>>,
    identity_policy: IdentityPolicy,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only the render root
    pub fn new() -> Self {
        Self::with_identity_policy(IdentityPolicy::Mutable)
    }

    pub fn with_identity_policy(identity_policy: IdentityPolicy) -> Self {
        let mut world = hecs::World::new();
        let root = NodeHandle(world.spawn((
            NodeKind::Root,
            Transform::IDENTITY,
            NodeIdentity::fresh(true),
        )));

        Self {
            world,
            root,
            parents: HashMap::new(),
            children: HashMap::new(),
            identity_policy,
        }
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn identity_policy(&self) -> IdentityPolicy {
        self.identity_policy
    }

    /// Spawn a detached, untagged node
    pub fn spawn(&mut self, kind: NodeKind) -> NodeHandle {
        let reserved = self.identity_policy == IdentityPolicy::Reserved;
        NodeHandle(
            self.world
                .spawn((kind, Transform::IDENTITY, NodeIdentity::fresh(reserved))),
        )
    }

    /// Spawn a detached mesh node
    pub fn spawn_mesh(&mut self, part: MeshPart) -> NodeHandle {
        let node = self.spawn(NodeKind::Mesh);
        // Freshly spawned, cannot fail
        let _ = self.world.insert_one(node.0, part);
        node
    }

    /// Check if a node exists (attached or not)
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.world.contains(node.0)
    }

    /// Number of live nodes, including the root and detached nodes
    pub fn node_count(&self) -> usize {
        self.world.len() as usize
    }

    pub fn kind(&self, node: NodeHandle) -> Option<NodeKind> {
        self.world.get::<&NodeKind>(node.0).ok().map(|k| *k)
    }

    pub fn transform(&self, node: NodeHandle) -> Option<Transform> {
        self.world.get::<&Transform>(node.0).ok().map(|t| *t)
    }

    pub fn set_transform(&mut self, node: NodeHandle, transform: Transform) -> Result<()> {
        let mut current = self
            .world
            .get::<&mut Transform>(node.0)
            .map_err(|_| not_found(node))?;
        *current = transform;
        Ok(())
    }

    pub fn tag(&self, node: NodeHandle) -> Option<NodeTag> {
        self.world.get::<&NodeTag>(node.0).ok().map(|t| (*t).clone())
    }

    pub fn set_tag(&mut self, node: NodeHandle, tag: NodeTag) -> Result<()> {
        self.world
            .insert_one(node.0, tag)
            .map_err(|_| not_found(node))
    }

    pub fn mesh(&self, node: NodeHandle) -> Option<MeshPart> {
        self.world.get::<&MeshPart>(node.0).ok().map(|m| *m)
    }

    pub fn identity(&self, node: NodeHandle) -> Option<NodeIdentity> {
        self.world
            .get::<&NodeIdentity>(node.0)
            .ok()
            .map(|i| (*i).clone())
    }

    /// Attempt to make the node's native identity equal `id`.
    ///
    /// Refused with `IdentityReserved` when the engine owns the identity;
    /// callers then keep their own id-to-handle map.
    pub fn try_set_identity(&mut self, node: NodeHandle, id: &str) -> Result<()> {
        let mut identity = self
            .world
            .get::<&mut NodeIdentity>(node.0)
            .map_err(|_| not_found(node))?;
        if identity.reserved {
            return Err(AtelierError::IdentityReserved(id.to_string()));
        }
        identity.assigned = Some(id.to_string());
        Ok(())
    }

    /// Get parent of a node
    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.parents.get(&node).copied()
    }

    /// Get ordered children of a node
    pub fn children(&self, node: NodeHandle) -> &[NodeHandle] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ancestors from the parent upward, ending with the topmost ancestor
    pub fn ancestors(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut chain = Vec::new();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent(parent);
        }
        chain
    }

    /// All descendants in pre-order, excluding `node` itself
    pub fn descendants(&self, node: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeHandle> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether the node's ancestor chain terminates at the render root
    pub fn is_in_tree(&self, node: NodeHandle) -> bool {
        if !self.contains(node) {
            return false;
        }
        node == self.root || self.ancestors(node).last() == Some(&self.root)
    }

    /// Attach `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn attach(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        if !self.contains(parent) {
            return Err(not_found(parent));
        }
        if !self.contains(child) {
            return Err(not_found(child));
        }
        if child == self.root || child == parent || self.ancestors(parent).contains(&child) {
            return Err(AtelierError::InvalidHierarchy(format!(
                "cannot attach {:?} under {:?}",
                child, parent
            )));
        }

        self.unlink(child);
        self.parents.insert(child, parent);
        self.children.entry(parent).or_default().push(child);
        Ok(())
    }

    /// Detach a node (and its subtree) from its parent. The nodes stay alive.
    pub fn detach(&mut self, node: NodeHandle) -> Result<()> {
        if !self.contains(node) {
            return Err(not_found(node));
        }
        self.unlink(node);
        Ok(())
    }

    /// Detach and destroy a node and its whole subtree
    pub fn despawn(&mut self, node: NodeHandle) -> Result<()> {
        if node == self.root {
            return Err(AtelierError::InvalidHierarchy(
                "the render root cannot be despawned".to_string(),
            ));
        }
        if !self.contains(node) {
            return Err(not_found(node));
        }

        self.unlink(node);
        let mut doomed = self.descendants(node);
        doomed.push(node);
        for handle in doomed {
            self.children.remove(&handle);
            self.parents.remove(&handle);
            let _ = self.world.despawn(handle.0);
        }
        Ok(())
    }

    /// Deep-clone a subtree. The copy is detached and gets fresh, reserved
    /// identities; kinds, transforms, tags and meshes are copied.
    pub fn clone_subtree(&mut self, source: NodeHandle) -> Result<NodeHandle> {
        let kind = self.kind(source).ok_or_else(|| not_found(source))?;
        let copy = self.spawn(if kind == NodeKind::Root {
            NodeKind::Generic
        } else {
            kind
        });

        if let Ok(mut identity) = self.world.get::<&mut NodeIdentity>(copy.0) {
            // Clones keep engine-owned identities
            identity.reserved = true;
        }
        if let Some(transform) = self.transform(source) {
            self.set_transform(copy, transform)?;
        }
        if let Some(tag) = self.tag(source) {
            self.set_tag(copy, tag)?;
        }
        if let Some(mesh) = self.mesh(source) {
            let _ = self.world.insert_one(copy.0, mesh);
        }

        let source_children = self.children(source).to_vec();
        for child in source_children {
            let child_copy = self.clone_subtree(child)?;
            self.attach(copy, child_copy)?;
        }

        Ok(copy)
    }

    /// World-space matrix, walking the parent chain
    pub fn world_matrix(&self, node: NodeHandle) -> Option<[[f32; 4]; 4]> {
        let local = self.transform(node)?;
        match self.parents.get(&node) {
            Some(parent) => {
                let parent_mat = self.world_matrix(*parent)?;
                Some(mat4_mul(&parent_mat, &local.to_matrix()))
            }
            None => Some(local.to_matrix()),
        }
    }

    /// Every node currently carrying a mesh, attached or not
    pub fn mesh_nodes(&self) -> Vec<NodeHandle> {
        self.world
            .query::<&MeshPart>()
            .iter()
            .map(|(entity, _)| NodeHandle(entity))
            .collect()
    }

    fn unlink(&mut self, node: NodeHandle) {
        if let Some(parent) = self.parents.remove(&node) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| *c != node);
            }
        }
    }
}

fn not_found(node: NodeHandle) -> AtelierError {
    AtelierError::NodeNotFound(format!("{:?}", node))
}
