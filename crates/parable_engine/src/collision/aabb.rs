use glam::{Mat4, Vec3};

/// Axis-aligned box in whatever space its owner declares (world space for
/// colliders, node-local space for mesh bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Touching faces do not count as an intersection.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn overlaps_horizontally(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let first = matrix.transform_point3(corners[0]);
        let mut bounds = Aabb {
            min: first,
            max: first,
        };
        for corner in &corners[1..] {
            let point = matrix.transform_point3(*corner);
            bounds.min = bounds.min.min(point);
            bounds.max = bounds.max.max(point);
        }
        bounds
    }

    /// Slab test. Returns the distance along `direction` to the first hit, or the
    /// exit distance when the origin is inside the box.
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv_dir = Vec3::new(
            inverse_or_max(direction.x),
            inverse_or_max(direction.y),
            inverse_or_max(direction.z),
        );

        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;
        let t_near = t1.min(t2);
        let t_far = t1.max(t2);

        let t_min = t_near.x.max(t_near.y).max(t_near.z);
        let t_max = t_far.x.min(t_far.y).min(t_far.z);

        if t_max >= t_min && t_max >= 0.0 {
            Some(if t_min >= 0.0 { t_min } else { t_max })
        } else {
            None
        }
    }
}

fn inverse_or_max(value: f32) -> f32 {
    if value.abs() < 1.0e-6 {
        f32::MAX
    } else {
        1.0 / value
    }
}
