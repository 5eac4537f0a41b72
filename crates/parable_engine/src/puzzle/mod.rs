mod events;
mod lifecycle;
mod orchestrator;
mod schedule;

pub use events::{
    EventBus, EventHandler, LifecycleEvent, LifecycleEventCounts, LifecycleEventKind,
    SubscriptionId,
};
pub use lifecycle::{PuzzleLifecycle, PuzzleState};
pub use orchestrator::{ProgressionMode, PuzzleOrchestrator};
pub use schedule::{DeferredTasks, TaskId};

use crate::collision::ColliderStore;
use crate::interaction::InteractionMediator;
use crate::scene::SceneGraph;

/// Everything a puzzle hook may touch during one call.
pub struct PuzzleContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub colliders: &'a mut ColliderStore,
    pub interaction: &'a mut InteractionMediator,
    pub events: &'a mut EventBus,
    solve_requested: bool,
}

impl<'a> PuzzleContext<'a> {
    pub fn new(
        scene: &'a mut SceneGraph,
        colliders: &'a mut ColliderStore,
        interaction: &'a mut InteractionMediator,
        events: &'a mut EventBus,
    ) -> Self {
        Self {
            scene,
            colliders,
            interaction,
            events,
            solve_requested: false,
        }
    }

    /// Asks for the calling puzzle to be solved once its hook returns.
    pub fn solve(&mut self) {
        self.solve_requested = true;
    }

    pub fn solve_requested(&self) -> bool {
        self.solve_requested
    }

    fn take_solve_request(&mut self) -> bool {
        std::mem::take(&mut self.solve_requested)
    }
}

/// One unit of game progression. Hooks default to doing nothing; the
/// orchestrator calls `on_activate` and `on_solved` exactly once each, after
/// the matching lifecycle event has been published.
pub trait Puzzle {
    fn id(&self) -> &str;

    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn init(&mut self, _ctx: &mut PuzzleContext<'_>) {}

    fn update(&mut self, _dt_seconds: f32, _ctx: &mut PuzzleContext<'_>) {}

    fn on_activate(&mut self, _ctx: &mut PuzzleContext<'_>) {}

    fn on_solved(&mut self, _ctx: &mut PuzzleContext<'_>) {}

    fn dispose(&mut self, _ctx: &mut PuzzleContext<'_>) {}
}
