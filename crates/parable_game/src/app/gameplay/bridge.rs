use std::cell::Cell;
use std::rc::Rc;

use parable_engine::{
    Aabb, GrabHandlers, Interactable, InteractableId, NodeId, Pose, Puzzle, PuzzleContext, Vec3,
};
use tracing::{debug, info};

use super::{
    BRIDGE_ID, BRIDGE_TARGET_CENTER, BRIDGE_TARGET_HALF_EXTENT, LEVER_ID, PLANK_REST_HEIGHT,
    PLANK_SIZE, PLANK_SPAWN_POSITION,
};

/// Carry the plank and drop it over the gap. The dropped plank becomes a
/// solid step.
pub(crate) struct BridgePuzzle {
    released_at: Rc<Cell<Option<Vec3>>>,
    plank: Option<(NodeId, InteractableId)>,
}

impl BridgePuzzle {
    pub(crate) fn new() -> Self {
        Self {
            released_at: Rc::new(Cell::new(None)),
            plank: None,
        }
    }
}

impl Puzzle for BridgePuzzle {
    fn id(&self) -> &str {
        BRIDGE_ID
    }

    fn dependencies(&self) -> Vec<String> {
        vec![LEVER_ID.to_string()]
    }

    fn on_activate(&mut self, ctx: &mut PuzzleContext<'_>) {
        let node = ctx.scene.spawn_mesh(
            "plank",
            None,
            Pose::from_translation(PLANK_SPAWN_POSITION),
            Aabb::from_center_size(Vec3::ZERO, PLANK_SIZE),
        );
        let released_at = Rc::clone(&self.released_at);
        let id = ctx.interaction.register(Interactable::grabbable(
            node,
            GrabHandlers::new().on_release(move |_, position| released_at.set(Some(position))),
        ));
        self.plank = Some((node, id));
    }

    fn update(&mut self, _dt_seconds: f32, ctx: &mut PuzzleContext<'_>) {
        let Some(position) = self.released_at.take() else {
            return;
        };
        let Some((node, id)) = self.plank else {
            return;
        };
        if !over_gap(position) {
            debug!(x = position.x, z = position.z, "plank_missed_target");
            return;
        }

        ctx.scene
            .set_world_position(node, Vec3::new(position.x, PLANK_REST_HEIGHT, position.z));
        ctx.colliders.add_box_from_world_extent(ctx.scene, node);
        ctx.interaction.unregister(ctx.scene, id);
        self.plank = None;
        info!(x = position.x, z = position.z, "plank_placed");
        ctx.solve();
    }

    fn dispose(&mut self, ctx: &mut PuzzleContext<'_>) {
        if let Some((node, id)) = self.plank.take() {
            ctx.interaction.unregister(ctx.scene, id);
            ctx.scene.despawn(node);
        }
    }
}

fn over_gap(position: Vec3) -> bool {
    (position.x - BRIDGE_TARGET_CENTER.x).abs() <= BRIDGE_TARGET_HALF_EXTENT
        && (position.z - BRIDGE_TARGET_CENTER.z).abs() <= BRIDGE_TARGET_HALF_EXTENT
}
