use glam::Vec3;
use tracing::debug;

use super::Aabb;
use crate::scene::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub handle: ColliderHandle,
    pub bounds: Aabb,
}

/// Static world geometry as world-space boxes plus the ground plane height.
/// Append-only while a level runs; cleared in bulk on unload.
#[derive(Debug, Default)]
pub struct ColliderStore {
    next_handle: u64,
    colliders: Vec<Collider>,
    ground_height: f32,
}

impl ColliderStore {
    pub fn new(ground_height: f32) -> Self {
        Self {
            ground_height,
            ..Self::default()
        }
    }

    /// `x, y, z` is the box center; `w, h, d` its full extent on each axis.
    pub fn add_box(&mut self, x: f32, y: f32, z: f32, w: f32, h: f32, d: f32) -> ColliderHandle {
        self.add_aabb(Aabb::from_center_size(
            Vec3::new(x, y, z),
            Vec3::new(w, h, d),
        ))
    }

    pub fn add_aabb(&mut self, bounds: Aabb) -> ColliderHandle {
        let handle = ColliderHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.colliders.push(Collider { handle, bounds });
        debug!(
            collider = handle.0,
            min = ?bounds.min,
            max = ?bounds.max,
            "collider_added"
        );
        handle
    }

    /// Registers the world-space extent of a scene object (all of its mesh
    /// parts). Objects without mesh bounds produce no collider.
    pub fn add_box_from_world_extent(
        &mut self,
        scene: &SceneGraph,
        node: NodeId,
    ) -> Option<ColliderHandle> {
        let bounds = scene.world_bounds(node)?;
        Some(self.add_aabb(bounds))
    }

    pub fn clear(&mut self) {
        if !self.colliders.is_empty() {
            debug!(count = self.colliders.len(), "colliders_cleared");
        }
        self.colliders.clear();
    }

    pub fn set_ground_height(&mut self, y: f32) {
        self.ground_height = y;
    }

    pub fn ground_height(&self) -> f32 {
        self.ground_height
    }

    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders
            .iter()
            .find(|collider| collider.handle == handle)
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}
