use std::cell::Cell;
use std::rc::Rc;

use parable_engine::{
    ActivateHandlers, Interactable, InteractableId, NodeId, Pose, Puzzle, PuzzleContext,
};
use tracing::info;

use super::{interactable_bounds, BRIDGE_ID, GATE_BUTTON_POSITION, GATE_ID, LEVER_ID};

/// Press the gate button beyond the bridge. Needs the lever and the bridge.
pub(crate) struct GatePuzzle {
    pressed: Rc<Cell<bool>>,
    button: Option<(NodeId, InteractableId)>,
}

impl GatePuzzle {
    pub(crate) fn new() -> Self {
        Self {
            pressed: Rc::new(Cell::new(false)),
            button: None,
        }
    }
}

impl Puzzle for GatePuzzle {
    fn id(&self) -> &str {
        GATE_ID
    }

    fn dependencies(&self) -> Vec<String> {
        vec![LEVER_ID.to_string(), BRIDGE_ID.to_string()]
    }

    fn on_activate(&mut self, ctx: &mut PuzzleContext<'_>) {
        let node = ctx.scene.spawn_mesh(
            "gate_button",
            None,
            Pose::from_translation(GATE_BUTTON_POSITION),
            interactable_bounds(),
        );
        let pressed = Rc::clone(&self.pressed);
        let id = ctx.interaction.register(Interactable::activatable(
            node,
            ActivateHandlers::new().on_activate(move || pressed.set(true)),
        ));
        self.button = Some((node, id));
    }

    fn update(&mut self, _dt_seconds: f32, ctx: &mut PuzzleContext<'_>) {
        if self.pressed.get() {
            ctx.solve();
        }
    }

    fn on_solved(&mut self, ctx: &mut PuzzleContext<'_>) {
        if let Some((_, id)) = self.button {
            ctx.interaction.set_enabled(id, false);
        }
        info!("gate_opened");
    }

    fn dispose(&mut self, ctx: &mut PuzzleContext<'_>) {
        if let Some((node, id)) = self.button.take() {
            ctx.interaction.unregister(ctx.scene, id);
            ctx.scene.despawn(node);
        }
    }
}
