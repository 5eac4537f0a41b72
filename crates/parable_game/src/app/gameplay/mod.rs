use parable_engine::{Aabb, LevelRuntime, Pose, TuningConfig, Vec3};
use tracing::info;

mod bridge;
mod gate;
mod lever;

pub(crate) use bridge::BridgePuzzle;
pub(crate) use gate::GatePuzzle;
pub(crate) use lever::LeverPuzzle;

pub(crate) const LEVER_ID: &str = "lever";
pub(crate) const BRIDGE_ID: &str = "bridge";
pub(crate) const GATE_ID: &str = "gate";

const LEVER_POSITION: Vec3 = Vec3::new(0.0, 1.6, -1.5);
const PLANK_SPAWN_POSITION: Vec3 = Vec3::new(0.0, 1.6, -1.0);
const PLANK_REST_HEIGHT: f32 = 0.05;
const BRIDGE_TARGET_CENTER: Vec3 = Vec3::new(0.0, 0.0, -3.0);
const BRIDGE_TARGET_HALF_EXTENT: f32 = 0.6;
const GATE_BUTTON_POSITION: Vec3 = Vec3::new(0.0, 1.6, -4.0);
const INTERACTABLE_SIZE: f32 = 0.2;
const PLANK_SIZE: Vec3 = Vec3::new(0.3, 0.1, 0.3);

/// Lever, then a plank carried into the gap, then the gate button. The
/// gate needs both earlier puzzles, so the level runs in graph mode.
pub(crate) fn build_demo_level(config: TuningConfig) -> LevelRuntime {
    let mut level = LevelRuntime::new(config);

    let back_wall = level.scene_mut().spawn_mesh(
        "back_wall",
        None,
        Pose::from_translation(Vec3::new(0.0, 1.5, 2.5)),
        Aabb::from_center_size(Vec3::ZERO, Vec3::new(6.0, 3.0, 1.0)),
    );
    level.add_solid_from_scene(back_wall);

    level.register_puzzle(Box::new(LeverPuzzle::new()));
    level.register_puzzle(Box::new(BridgePuzzle::new()));
    level.register_puzzle(Box::new(GatePuzzle::new()));
    info!(
        puzzles = level.puzzles().len(),
        colliders = level.colliders().len(),
        "demo_level_built"
    );
    level
}

fn interactable_bounds() -> Aabb {
    Aabb::from_center_size(Vec3::ZERO, Vec3::splat(INTERACTABLE_SIZE))
}
