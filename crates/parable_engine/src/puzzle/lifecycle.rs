use tracing::info;

use super::{EventBus, LifecycleEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuzzleState {
    Locked,
    Active,
    Solved,
}

impl PuzzleState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Active => "active",
            Self::Solved => "solved",
        }
    }
}

/// The monotonic locked -> active -> solved state of one puzzle. Each
/// transition publishes its event and reports whether it happened; callers
/// run the puzzle's hook only on `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleLifecycle {
    id: String,
    dependencies: Vec<String>,
    state: PuzzleState,
}

impl PuzzleLifecycle {
    pub fn new(id: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            id: id.into(),
            dependencies,
            state: PuzzleState::Locked,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn state(&self) -> PuzzleState {
        self.state
    }

    pub fn activate(&mut self, events: &mut EventBus) -> bool {
        if self.state != PuzzleState::Locked {
            return false;
        }
        self.state = PuzzleState::Active;
        info!(puzzle = %self.id, "puzzle_activated");
        events.publish(LifecycleEvent::PuzzleActivated {
            id: self.id.clone(),
        });
        true
    }

    pub fn solve(&mut self, events: &mut EventBus) -> bool {
        if self.state != PuzzleState::Active {
            return false;
        }
        self.state = PuzzleState::Solved;
        info!(puzzle = %self.id, "puzzle_solved");
        events.publish(LifecycleEvent::PuzzleSolved {
            id: self.id.clone(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recording_bus() -> (EventBus, Rc<RefCell<Vec<String>>>) {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe_all(move |event| sink.borrow_mut().push(event.to_string()));
        (bus, seen)
    }

    #[test]
    fn solve_is_a_no_op_unless_active() {
        let (mut bus, seen) = recording_bus();
        let mut lifecycle = PuzzleLifecycle::new("lever", Vec::new());

        assert!(!lifecycle.solve(&mut bus));
        assert_eq!(lifecycle.state(), PuzzleState::Locked);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn transitions_fire_each_event_exactly_once() {
        let (mut bus, seen) = recording_bus();
        let mut lifecycle = PuzzleLifecycle::new("lever", Vec::new());

        assert!(lifecycle.activate(&mut bus));
        assert!(!lifecycle.activate(&mut bus));
        assert!(lifecycle.solve(&mut bus));
        assert!(!lifecycle.solve(&mut bus));
        assert!(!lifecycle.activate(&mut bus));

        assert_eq!(lifecycle.state(), PuzzleState::Solved);
        assert_eq!(
            seen.borrow().as_slice(),
            [
                "puzzle:activated {id: lever}".to_string(),
                "puzzle:solved {id: lever}".to_string(),
            ]
        );
    }

    #[test]
    fn root_means_no_dependencies() {
        assert!(PuzzleLifecycle::new("a", Vec::new()).is_root());
        assert!(!PuzzleLifecycle::new("b", vec!["a".to_string()]).is_root());
    }
}
