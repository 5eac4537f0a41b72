use glam::{Quat, Vec2, Vec3};
use tracing::debug;

use crate::collision::ResolveResult;
use crate::config::LocomotionTuning;
use crate::scene::Pose;

const MIN_HEADING_LENGTH: f32 = 1.0e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionInput {
    /// `x` strafes right, `y` moves forward. Clamped to unit length.
    pub move_axis: Vec2,
    pub turn_axis: f32,
    pub jump_pressed: bool,
}

impl LocomotionInput {
    pub fn with_move(mut self, x: f32, y: f32) -> Self {
        self.move_axis = Vec2::new(x, y);
        self
    }

    pub fn with_turn(mut self, axis: f32) -> Self {
        self.turn_axis = axis;
        self
    }

    pub fn with_jump(mut self, pressed: bool) -> Self {
        self.jump_pressed = pressed;
        self
    }
}

/// World-space viewpoint the player is looking from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrame {
    pub position: Vec3,
    pub forward: Vec3,
}

impl ViewFrame {
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            position: pose.translation,
            forward: pose.rotation * Vec3::NEG_Z,
        }
    }

    /// Forward projected onto the ground plane, or `None` when looking
    /// straight up or down.
    pub fn horizontal_heading(&self) -> Option<Vec3> {
        let flat = Vec3::new(self.forward.x, 0.0, self.forward.z);
        if flat.length() < MIN_HEADING_LENGTH {
            return None;
        }
        Some(flat.normalize())
    }
}

#[derive(Debug, Clone)]
pub struct Locomotion {
    tuning: LocomotionTuning,
    vertical_velocity: f32,
    grounded: bool,
    double_jump_available: bool,
    double_jumped: bool,
    turn_cooldown: f32,
}

impl Locomotion {
    pub fn new(tuning: LocomotionTuning) -> Self {
        Self {
            tuning,
            vertical_velocity: 0.0,
            grounded: false,
            double_jump_available: false,
            double_jumped: false,
            turn_cooldown: 0.0,
        }
    }

    pub fn tuning(&self) -> &LocomotionTuning {
        &self.tuning
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn can_double_jump(&self) -> bool {
        self.double_jump_available
    }

    /// Drops all vertical state, e.g. after a teleport.
    pub fn reset(&mut self) {
        self.vertical_velocity = 0.0;
        self.grounded = false;
        self.double_jump_available = false;
        self.double_jumped = false;
        self.turn_cooldown = 0.0;
    }

    /// Candidate rig pose for this frame. Grounded state is left untouched
    /// except when a jump leaves the ground; `commit` settles it.
    pub fn propose(
        &mut self,
        dt: f32,
        input: &LocomotionInput,
        rig: Pose,
        view: ViewFrame,
    ) -> Pose {
        let mut proposed = rig;
        let mut view = view;

        self.turn_cooldown = (self.turn_cooldown - dt).max(0.0);
        if input.turn_axis.abs() > self.tuning.turn_deadzone && self.turn_cooldown <= 0.0 {
            let angle = -input.turn_axis.signum() * self.tuning.snap_turn_degrees.to_radians();
            let turn = Quat::from_rotation_y(angle);
            let pivot = Vec3::new(view.position.x, proposed.translation.y, view.position.z);
            proposed.translation = pivot + turn * (proposed.translation - pivot);
            proposed.rotation = (turn * proposed.rotation).normalize();
            view.forward = turn * view.forward;
            self.turn_cooldown = self.tuning.snap_turn_cooldown_seconds;
            debug!(degrees = angle.to_degrees(), "snap_turn");
        }

        if let Some(forward) = view.horizontal_heading() {
            let right = forward.cross(Vec3::Y);
            let axis = input.move_axis.clamp_length_max(1.0);
            let step = (forward * axis.y + right * axis.x) * self.tuning.move_speed * dt;
            proposed.translation += step;
        }

        if input.jump_pressed {
            self.try_jump();
        }

        let gravity = if self.double_jumped && self.vertical_velocity < 0.0 {
            self.tuning.float_gravity
        } else {
            self.tuning.gravity
        };
        self.vertical_velocity -= gravity * dt;
        proposed.translation.y += self.vertical_velocity * dt;

        proposed
    }

    pub fn commit(&mut self, result: &ResolveResult) {
        self.grounded = result.grounded;
        if result.grounded {
            self.vertical_velocity = 0.0;
            self.double_jump_available = false;
            self.double_jumped = false;
        } else if result.hit_ceiling && self.vertical_velocity > 0.0 {
            self.vertical_velocity = 0.0;
        }
    }

    fn try_jump(&mut self) {
        if self.grounded {
            self.vertical_velocity = self.tuning.jump_velocity;
            self.grounded = false;
            self.double_jump_available = true;
            self.double_jumped = false;
            debug!(velocity = self.vertical_velocity, "jump");
        } else if self.double_jump_available && self.vertical_velocity > 0.0 {
            self.vertical_velocity = self.tuning.double_jump_velocity;
            self.double_jump_available = false;
            self.double_jumped = true;
            debug!(velocity = self.vertical_velocity, "double_jump");
        }
    }
}
