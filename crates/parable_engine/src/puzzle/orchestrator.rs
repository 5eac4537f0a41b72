use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::{
    DeferredTasks, LifecycleEvent, Puzzle, PuzzleContext, PuzzleLifecycle, PuzzleState, TaskId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionMode {
    /// Registration order, one puzzle at a time.
    Linear,
    /// Each puzzle unlocks once all of its prerequisites are solved.
    Graph,
}

impl ProgressionMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Graph => "graph",
        }
    }
}

struct PuzzleEntry {
    lifecycle: PuzzleLifecycle,
    puzzle: Box<dyn Puzzle>,
    scheduled: Option<TaskId>,
}

/// Owns every puzzle of a level and decides when each one activates.
///
/// The mode is derived from the registered set: a single puzzle with
/// prerequisites switches the whole level to graph mode.
pub struct PuzzleOrchestrator {
    advance_delay_seconds: f32,
    order: Vec<String>,
    entries: HashMap<String, PuzzleEntry>,
    pending: DeferredTasks<String>,
    complete: bool,
}

impl PuzzleOrchestrator {
    pub fn new(advance_delay_seconds: f32) -> Self {
        Self {
            advance_delay_seconds,
            order: Vec::new(),
            entries: HashMap::new(),
            pending: DeferredTasks::new(),
            complete: false,
        }
    }

    /// Adds `puzzle`, replacing any earlier puzzle with the same id. The
    /// replacement keeps the original position in registration order.
    pub fn register(&mut self, puzzle: Box<dyn Puzzle>) {
        let id = puzzle.id().to_string();
        let lifecycle = PuzzleLifecycle::new(id.clone(), puzzle.dependencies());
        let entry = PuzzleEntry {
            lifecycle,
            puzzle,
            scheduled: None,
        };
        match self.entries.insert(id.clone(), entry) {
            Some(previous) => {
                if let Some(task) = previous.scheduled {
                    self.pending.cancel(task);
                }
                warn!(puzzle = %id, "puzzle_reregistered");
            }
            None => {
                debug!(
                    puzzle = %id,
                    dependencies = ?self.entries[&id].lifecycle.dependencies(),
                    "puzzle_registered"
                );
                self.order.push(id);
            }
        }
    }

    pub fn mode(&self) -> ProgressionMode {
        if self
            .entries
            .values()
            .any(|entry| !entry.lifecycle.is_root())
        {
            ProgressionMode::Graph
        } else {
            ProgressionMode::Linear
        }
    }

    /// Runs every puzzle's `init` hook, then activates the starting set:
    /// all roots in graph mode, the first registered puzzle in linear mode.
    pub fn init(&mut self, ctx: &mut PuzzleContext<'_>) {
        for id in self.order.clone() {
            if let Some(entry) = self.entries.get_mut(&id) {
                ctx.take_solve_request();
                entry.puzzle.init(ctx);
            }
            if ctx.take_solve_request() {
                debug!(puzzle = %id, "solve_requested_before_activation_ignored");
            }
        }

        let mode = self.mode();
        info!(
            mode = mode.name(),
            puzzle_count = self.order.len(),
            "puzzles_initialized"
        );
        let unsatisfiable = self.unsatisfiable_puzzles();
        if !unsatisfiable.is_empty() {
            warn!(puzzles = ?unsatisfiable, "unsatisfiable_puzzles");
        }

        let starting: Vec<String> = match mode {
            ProgressionMode::Graph => self
                .order
                .iter()
                .filter(|id| self.entries[*id].lifecycle.is_root())
                .cloned()
                .collect(),
            ProgressionMode::Linear => self.order.first().cloned().into_iter().collect(),
        };
        for id in starting {
            self.activate(&id, ctx);
        }
    }

    pub fn activate(&mut self, id: &str, ctx: &mut PuzzleContext<'_>) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            debug!(puzzle = %id, "activate_unknown_puzzle");
            return false;
        };
        if !entry.lifecycle.activate(ctx.events) {
            return false;
        }
        entry.scheduled = None;
        ctx.take_solve_request();
        entry.puzzle.on_activate(ctx);
        if ctx.take_solve_request() {
            self.solve(id, ctx);
        }
        true
    }

    pub fn solve(&mut self, id: &str, ctx: &mut PuzzleContext<'_>) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            debug!(puzzle = %id, "solve_unknown_puzzle");
            return false;
        };
        if !entry.lifecycle.solve(ctx.events) {
            return false;
        }
        ctx.take_solve_request();
        entry.puzzle.on_solved(ctx);
        ctx.take_solve_request();
        self.advance_after(id, ctx);
        true
    }

    /// Fires due activations, then updates every active puzzle in
    /// registration order.
    pub fn update(&mut self, dt_seconds: f32, ctx: &mut PuzzleContext<'_>) {
        for id in self.pending.advance(dt_seconds) {
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.scheduled = None;
            }
            self.activate(&id, ctx);
        }

        for id in self.order.clone() {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            if entry.lifecycle.state() != PuzzleState::Active {
                continue;
            }
            ctx.take_solve_request();
            entry.puzzle.update(dt_seconds, ctx);
            if ctx.take_solve_request() {
                self.solve(&id, ctx);
            }
        }
    }

    pub fn state(&self, id: &str) -> Option<PuzzleState> {
        self.entries.get(id).map(|entry| entry.lifecycle.state())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids waiting on their activation delay, in schedule order.
    pub fn pending_activations(&self) -> Vec<&str> {
        self.pending.iter().map(String::as_str).collect()
    }

    /// Locked puzzles that can never activate: a prerequisite is missing
    /// from the level or sits on a dependency cycle. Graph mode only.
    pub fn unsatisfiable_puzzles(&self) -> Vec<String> {
        if self.mode() != ProgressionMode::Graph {
            return Vec::new();
        }
        let mut reachable: HashSet<&str> = self
            .entries
            .values()
            .filter(|entry| {
                entry.lifecycle.is_root() || entry.lifecycle.state() != PuzzleState::Locked
            })
            .map(|entry| entry.lifecycle.id())
            .collect();
        loop {
            let before = reachable.len();
            for entry in self.entries.values() {
                let id = entry.lifecycle.id();
                if reachable.contains(id) {
                    continue;
                }
                if entry
                    .lifecycle
                    .dependencies()
                    .iter()
                    .all(|dependency| reachable.contains(dependency.as_str()))
                {
                    reachable.insert(id);
                }
            }
            if reachable.len() == before {
                break;
            }
        }
        self.order
            .iter()
            .filter(|id| !reachable.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Cancels pending activations, runs every `dispose` hook and drops all
    /// puzzles.
    pub fn dispose(&mut self, ctx: &mut PuzzleContext<'_>) {
        let cancelled = self.pending.cancel_all();
        for id in &self.order {
            if let Some(entry) = self.entries.get_mut(id) {
                entry.puzzle.dispose(ctx);
            }
        }
        ctx.take_solve_request();
        info!(
            puzzle_count = self.order.len(),
            cancelled_activations = cancelled,
            "puzzles_disposed"
        );
        self.order.clear();
        self.entries.clear();
        self.complete = false;
    }

    fn advance_after(&mut self, solved_id: &str, ctx: &mut PuzzleContext<'_>) {
        match self.mode() {
            ProgressionMode::Graph => {
                let ready: Vec<String> = self
                    .order
                    .iter()
                    .filter(|id| self.is_ready(id))
                    .cloned()
                    .collect();
                let newly_scheduled = ready.len();
                for id in ready {
                    self.schedule_activation(&id);
                }
                let all_solved = self
                    .entries
                    .values()
                    .all(|entry| entry.lifecycle.state() == PuzzleState::Solved);
                if newly_scheduled == 0 && all_solved {
                    self.complete_game(ctx);
                }
            }
            ProgressionMode::Linear => {
                let next = self
                    .order
                    .iter()
                    .position(|id| id == solved_id)
                    .and_then(|index| self.order.get(index + 1))
                    .cloned();
                match next {
                    Some(next_id) => {
                        let locked = self.state(&next_id) == Some(PuzzleState::Locked);
                        if locked && self.entries[&next_id].scheduled.is_none() {
                            self.schedule_activation(&next_id);
                        }
                    }
                    None => self.complete_game(ctx),
                }
            }
        }
    }

    fn is_ready(&self, id: &str) -> bool {
        let Some(entry) = self.entries.get(id) else {
            return false;
        };
        entry.lifecycle.state() == PuzzleState::Locked
            && entry.scheduled.is_none()
            && entry.lifecycle.dependencies().iter().all(|dependency| {
                self.state(dependency) == Some(PuzzleState::Solved)
            })
    }

    fn schedule_activation(&mut self, id: &str) {
        let task = self.pending.schedule(self.advance_delay_seconds, id.to_string());
        if let Some(entry) = self.entries.get_mut(id) {
            entry.scheduled = Some(task);
        }
        debug!(
            puzzle = %id,
            delay_seconds = self.advance_delay_seconds,
            "puzzle_activation_scheduled"
        );
    }

    fn complete_game(&mut self, ctx: &mut PuzzleContext<'_>) {
        if self.complete {
            return;
        }
        self.complete = true;
        info!(puzzle_count = self.order.len(), "game_complete");
        ctx.events.publish(LifecycleEvent::GameComplete);
    }
}

impl std::fmt::Debug for PuzzleOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<(&str, &str)> = self
            .order
            .iter()
            .filter_map(|id| {
                self.entries
                    .get(id)
                    .map(|entry| (id.as_str(), entry.lifecycle.state().name()))
            })
            .collect();
        f.debug_struct("PuzzleOrchestrator")
            .field("mode", &self.mode())
            .field("puzzles", &states)
            .field("pending", &self.pending_activations())
            .field("complete", &self.complete)
            .finish()
    }
}
