mod pose;

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use tracing::debug;

use crate::collision::Aabb;

pub use pose::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

#[derive(Debug, Default)]
struct NodeIdAllocator {
    next: u64,
}

impl NodeIdAllocator {
    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Pose,
    mesh_bounds: Option<Aabb>,
}

impl SceneNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local(&self) -> Pose {
        self.local
    }

    pub fn mesh_bounds(&self) -> Option<Aabb> {
        self.mesh_bounds
    }
}

/// Ownership and coordinate-frame hierarchy. A node with no parent lives
/// directly in world space. Every node has exactly one parent at any time;
/// `reparent` swaps it in a single step.
#[derive(Debug, Default)]
pub struct SceneGraph {
    allocator: NodeIdAllocator,
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local: Pose,
    ) -> NodeId {
        let parent = match parent {
            Some(parent_id) if self.nodes.contains_key(&parent_id) => Some(parent_id),
            Some(parent_id) => {
                debug!(parent = parent_id.0, "spawn_parent_missing_attached_to_root");
                None
            }
            None => None,
        };
        let id = self.allocator.allocate();
        self.nodes.insert(
            id,
            SceneNode {
                id,
                name: name.into(),
                parent,
                children: Vec::new(),
                local,
                mesh_bounds: None,
            },
        );
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
                parent_node.children.push(id);
            }
        }
        id
    }

    pub fn spawn_mesh(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local: Pose,
        bounds: Aabb,
    ) -> NodeId {
        let id = self.spawn(name, parent, local);
        self.set_mesh_bounds(id, Some(bounds));
        id
    }

    /// Removes `id` and its whole subtree.
    pub fn despawn(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if let Some(parent_id) = node.parent {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.retain(|child| *child != id);
            }
        }
        for doomed in self.subtree(id) {
            self.nodes.remove(&doomed);
        }
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Nodes attached directly to the world root, oldest first.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.parent.is_none())
            .map(|node| node.id)
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.name == name)
            .map(|node| node.id)
    }

    pub fn set_mesh_bounds(&mut self, id: NodeId, bounds: Option<Aabb>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.mesh_bounds = bounds;
                true
            }
            None => false,
        }
    }

    pub fn local_pose(&self, id: NodeId) -> Option<Pose> {
        self.nodes.get(&id).map(|node| node.local)
    }

    pub fn set_local_pose(&mut self, id: NodeId, local: Pose) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.local = local;
                true
            }
            None => false,
        }
    }

    /// World transform of `id`; identity for unknown nodes (the world root).
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = self.nodes.get(&id);
        while let Some(node) = cursor {
            matrix = node.local.to_matrix() * matrix;
            cursor = node.parent.and_then(|parent| self.nodes.get(&parent));
        }
        matrix
    }

    fn parent_world_matrix(&self, id: NodeId) -> Mat4 {
        match self.parent(id) {
            Some(parent) => self.world_matrix(parent),
            None => Mat4::IDENTITY,
        }
    }

    pub fn world_pose(&self, id: NodeId) -> Option<Pose> {
        if !self.contains(id) {
            return None;
        }
        Some(Pose::from_matrix(&self.world_matrix(id)))
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        if !self.contains(id) {
            return None;
        }
        Some(self.world_matrix(id).transform_point3(Vec3::ZERO))
    }

    pub fn set_world_pose(&mut self, id: NodeId, world: Pose) -> bool {
        if !self.contains(id) {
            return false;
        }
        let local = Pose::relative_to(&world, &self.parent_world_matrix(id));
        self.set_local_pose(id, local)
    }

    /// Moves `id` to `position` in world space, keeping its world rotation and scale.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> bool {
        let Some(mut world) = self.world_pose(id) else {
            return false;
        };
        world.translation = position;
        self.set_world_pose(id, world)
    }

    /// Detaches `id` from its current parent and attaches it under `new_parent`
    /// (or the world root) with the given local pose. Rejects moves that would
    /// create a cycle.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>, local: Pose) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(parent_id) = new_parent {
            if !self.contains(parent_id) || self.is_descendant_of(parent_id, id) {
                return false;
            }
        }

        let old_parent = self.parent(id);
        if let Some(old_parent_id) = old_parent {
            if let Some(old) = self.nodes.get_mut(&old_parent_id) {
                old.children.retain(|child| *child != id);
            }
        }
        if let Some(parent_id) = new_parent {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.children.push(id);
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = new_parent;
            node.local = local;
        }
        true
    }

    /// Reparents `id` while keeping its current world pose.
    pub fn attach_preserving_world(&mut self, id: NodeId, new_parent: Option<NodeId>) -> bool {
        let Some(world) = self.world_pose(id) else {
            return false;
        };
        let frame = match new_parent {
            Some(parent) if self.contains(parent) => self.world_matrix(parent),
            Some(_) => return false,
            None => Mat4::IDENTITY,
        };
        let local = Pose::relative_to(&world, &frame);
        self.reparent(id, new_parent, local)
    }

    /// True when `id` is `ancestor` or sits somewhere below it.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Pre-order listing of `id` and everything below it.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn world_mesh_bounds(&self, id: NodeId) -> Option<Aabb> {
        let bounds = self.nodes.get(&id)?.mesh_bounds?;
        Some(bounds.transformed(&self.world_matrix(id)))
    }

    /// Union of every mesh bound in the subtree of `id`, in world space.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.subtree(id)
            .into_iter()
            .filter_map(|node| self.world_mesh_bounds(node))
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}
