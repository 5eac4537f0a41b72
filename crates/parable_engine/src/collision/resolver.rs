use glam::Vec3;

use super::{Aabb, Collider};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerVolume {
    pub half_width: f32,
    pub height: f32,
}

impl PlayerVolume {
    /// Box for a player whose feet are at `position`.
    pub fn box_at(&self, position: Vec3) -> Aabb {
        Aabb {
            min: Vec3::new(
                position.x - self.half_width,
                position.y,
                position.z - self.half_width,
            ),
            max: Vec3::new(
                position.x + self.half_width,
                position.y + self.height,
                position.z + self.half_width,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolveResult {
    pub position: Vec3,
    pub grounded: bool,
    pub hit_ceiling: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeparationAxis {
    PosX,
    NegX,
    Up,
    Down,
    PosZ,
    NegZ,
}

/// Pushes the player volume out of static boxes each frame.
///
/// The only state carried between frames is the previously resolved feet
/// height, used to catch fast falls that skipped a thin platform entirely.
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    volume: PlayerVolume,
    previous_y: Option<f32>,
}

impl CollisionResolver {
    pub fn new(volume: PlayerVolume) -> Self {
        Self {
            volume,
            previous_y: None,
        }
    }

    pub fn volume(&self) -> PlayerVolume {
        self.volume
    }

    pub fn previous_y(&self) -> Option<f32> {
        self.previous_y
    }

    /// Forgets last frame's height so a teleport does not read as a fall.
    pub fn reset(&mut self) {
        self.previous_y = None;
    }

    pub fn resolve(
        &mut self,
        proposed: Vec3,
        colliders: &[Collider],
        ground_y: f32,
    ) -> ResolveResult {
        let mut position = proposed;
        let mut grounded = false;
        let mut hit_ceiling = false;

        for collider in colliders {
            let player = self.volume.box_at(position);
            if !player.intersects(&collider.bounds) {
                continue;
            }
            let solid = &collider.bounds;
            match min_separation(&player, solid) {
                SeparationAxis::PosX => position.x = solid.max.x + self.volume.half_width,
                SeparationAxis::NegX => position.x = solid.min.x - self.volume.half_width,
                SeparationAxis::PosZ => position.z = solid.max.z + self.volume.half_width,
                SeparationAxis::NegZ => position.z = solid.min.z - self.volume.half_width,
                SeparationAxis::Up => {
                    position.y = solid.max.y;
                    grounded = true;
                }
                SeparationAxis::Down => {
                    position.y = solid.min.y - self.volume.height;
                    hit_ceiling = true;
                }
            }
        }

        if !grounded {
            if let Some(top) = self.tunneled_surface(position, colliders) {
                position.y = top;
                grounded = true;
            }
        }

        if position.y <= ground_y {
            position.y = ground_y;
            grounded = true;
        }

        self.previous_y = Some(position.y);
        ResolveResult {
            position,
            grounded,
            hit_ceiling,
        }
    }

    fn tunneled_surface(&self, position: Vec3, colliders: &[Collider]) -> Option<f32> {
        let previous_y = self.previous_y?;
        let footprint = self.volume.box_at(position);
        colliders
            .iter()
            .map(|collider| &collider.bounds)
            .filter(|bounds| {
                let top = bounds.max.y;
                position.y < top && previous_y >= top && footprint.overlaps_horizontally(bounds)
            })
            .map(|bounds| bounds.max.y)
            .reduce(f32::max)
    }
}

/// Face of `solid` nearest to the player, picked by the smallest of the six
/// face-to-face overlaps. Ties keep the earlier candidate.
fn min_separation(player: &Aabb, solid: &Aabb) -> SeparationAxis {
    let candidates = [
        (SeparationAxis::PosX, solid.max.x - player.min.x),
        (SeparationAxis::NegX, player.max.x - solid.min.x),
        (SeparationAxis::Up, solid.max.y - player.min.y),
        (SeparationAxis::Down, player.max.y - solid.min.y),
        (SeparationAxis::PosZ, solid.max.z - player.min.z),
        (SeparationAxis::NegZ, player.max.z - solid.min.z),
    ];
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1.abs() < best.1.abs() {
            best = *candidate;
        }
    }
    best.0
}
