use std::cell::Cell;
use std::rc::Rc;

use parable_engine::{
    ActivateHandlers, Interactable, InteractableId, NodeId, Pose, Puzzle, PuzzleContext,
};
use tracing::info;

use super::{interactable_bounds, LEVER_ID, LEVER_POSITION};

/// Pull the lever once. Starts unlocked.
pub(crate) struct LeverPuzzle {
    pulled: Rc<Cell<bool>>,
    lever: Option<(NodeId, InteractableId)>,
}

impl LeverPuzzle {
    pub(crate) fn new() -> Self {
        Self {
            pulled: Rc::new(Cell::new(false)),
            lever: None,
        }
    }

    fn remove_lever(&mut self, ctx: &mut PuzzleContext<'_>) {
        if let Some((node, id)) = self.lever.take() {
            ctx.interaction.unregister(ctx.scene, id);
            ctx.scene.despawn(node);
        }
    }
}

impl Puzzle for LeverPuzzle {
    fn id(&self) -> &str {
        LEVER_ID
    }

    fn on_activate(&mut self, ctx: &mut PuzzleContext<'_>) {
        let node = ctx.scene.spawn_mesh(
            "lever",
            None,
            Pose::from_translation(LEVER_POSITION),
            interactable_bounds(),
        );
        let pulled = Rc::clone(&self.pulled);
        let id = ctx.interaction.register(Interactable::activatable(
            node,
            ActivateHandlers::new().on_activate(move || pulled.set(true)),
        ));
        self.lever = Some((node, id));
    }

    fn update(&mut self, _dt_seconds: f32, ctx: &mut PuzzleContext<'_>) {
        if self.pulled.get() {
            ctx.solve();
        }
    }

    fn on_solved(&mut self, ctx: &mut PuzzleContext<'_>) {
        info!("lever_pulled");
        self.remove_lever(ctx);
    }

    fn dispose(&mut self, ctx: &mut PuzzleContext<'_>) {
        self.remove_lever(ctx);
    }
}
