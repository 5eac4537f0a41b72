use std::fmt;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    PuzzleActivated { id: String },
    PuzzleSolved { id: String },
    GameComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    PuzzleActivated,
    PuzzleSolved,
    GameComplete,
}

impl LifecycleEvent {
    pub fn kind(&self) -> LifecycleEventKind {
        match self {
            Self::PuzzleActivated { .. } => LifecycleEventKind::PuzzleActivated,
            Self::PuzzleSolved { .. } => LifecycleEventKind::PuzzleSolved,
            Self::GameComplete => LifecycleEventKind::GameComplete,
        }
    }

    /// Wire name, e.g. `puzzle:solved`.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn puzzle_id(&self) -> Option<&str> {
        match self {
            Self::PuzzleActivated { id } | Self::PuzzleSolved { id } => Some(id),
            Self::GameComplete => None,
        }
    }
}

impl LifecycleEventKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::PuzzleActivated => "puzzle:activated",
            Self::PuzzleSolved => "puzzle:solved",
            Self::GameComplete => "game:complete",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.puzzle_id() {
            Some(id) => write!(f, "{} {{id: {id}}}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

pub type EventHandler = Box<dyn FnMut(&LifecycleEvent)>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleEventCounts {
    pub total: u32,
    pub puzzle_activated: u32,
    pub puzzle_solved: u32,
    pub game_complete: u32,
}

impl LifecycleEventCounts {
    fn record(&mut self, kind: LifecycleEventKind) {
        self.total = self.total.saturating_add(1);
        match kind {
            LifecycleEventKind::PuzzleActivated => {
                self.puzzle_activated = self.puzzle_activated.saturating_add(1)
            }
            LifecycleEventKind::PuzzleSolved => {
                self.puzzle_solved = self.puzzle_solved.saturating_add(1)
            }
            LifecycleEventKind::GameComplete => {
                self.game_complete = self.game_complete.saturating_add(1)
            }
        }
    }
}

struct Subscription {
    id: SubscriptionId,
    kind: Option<LifecycleEventKind>,
    handler: EventHandler,
}

/// Synchronous lifecycle event channel. `publish` runs every matching
/// handler, in subscription order, before it returns.
///
/// Published events are also kept for the current frame so the driver can
/// report them; `finish_frame` rolls them into per-kind counts.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
    current_frame_events: Vec<LifecycleEvent>,
    last_frame_counts: LifecycleEventCounts,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: LifecycleEventKind,
        handler: impl FnMut(&LifecycleEvent) + 'static,
    ) -> SubscriptionId {
        self.add_subscription(Some(kind), Box::new(handler))
    }

    pub fn subscribe_all(
        &mut self,
        handler: impl FnMut(&LifecycleEvent) + 'static,
    ) -> SubscriptionId {
        self.add_subscription(None, Box::new(handler))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|subscription| subscription.id != id);
        before != self.subscriptions.len()
    }

    pub fn publish(&mut self, event: LifecycleEvent) {
        debug!(event = event.name(), puzzle = ?event.puzzle_id(), "lifecycle_event");
        let kind = event.kind();
        for subscription in &mut self.subscriptions {
            if subscription.kind.map_or(true, |wanted| wanted == kind) {
                (subscription.handler)(&event);
            }
        }
        self.current_frame_events.push(event);
    }

    /// Drops every subscriber and the current frame's record.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.current_frame_events.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn iter_emitted_so_far(&self) -> impl Iterator<Item = &LifecycleEvent> {
        self.current_frame_events.iter()
    }

    pub fn finish_frame(&mut self) -> Vec<LifecycleEvent> {
        let mut counts = LifecycleEventCounts::default();
        for event in &self.current_frame_events {
            counts.record(event.kind());
        }
        self.last_frame_counts = counts;
        std::mem::take(&mut self.current_frame_events)
    }

    pub fn last_frame_counts(&self) -> LifecycleEventCounts {
        self.last_frame_counts
    }

    fn add_subscription(
        &mut self,
        kind: Option<LifecycleEventKind>,
        handler: EventHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.subscriptions.push(Subscription { id, kind, handler });
        id
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriptions.len())
            .field("current_frame_events", &self.current_frame_events)
            .field("last_frame_counts", &self.last_frame_counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn solved(id: &str) -> LifecycleEvent {
        LifecycleEvent::PuzzleSolved { id: id.to_string() }
    }

    #[test]
    fn events_use_wire_names() {
        assert_eq!(
            LifecycleEvent::PuzzleActivated { id: "a".into() }.name(),
            "puzzle:activated"
        );
        assert_eq!(solved("a").name(), "puzzle:solved");
        assert_eq!(LifecycleEvent::GameComplete.name(), "game:complete");
        assert_eq!(solved("gate").to_string(), "puzzle:solved {id: gate}");
    }

    #[test]
    fn publish_reaches_matching_subscribers_synchronously() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let solved_only = Rc::clone(&seen);
        let everything = Rc::clone(&seen);
        bus.subscribe(LifecycleEventKind::PuzzleSolved, move |event| {
            solved_only.borrow_mut().push(format!("solved_only:{event}"))
        });
        bus.subscribe_all(move |event| everything.borrow_mut().push(format!("all:{event}")));

        bus.publish(LifecycleEvent::GameComplete);
        assert_eq!(seen.borrow().len(), 1);
        bus.publish(solved("lever"));

        assert_eq!(
            seen.borrow().as_slice(),
            [
                "all:game:complete".to_string(),
                "solved_only:puzzle:solved {id: lever}".to_string(),
                "all:puzzle:solved {id: lever}".to_string(),
            ]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = bus.subscribe_all(move |_| *counter.borrow_mut() += 1);

        bus.publish(solved("a"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(solved("b"));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn finish_frame_counts_and_drains_events() {
        let mut bus = EventBus::new();
        bus.publish(LifecycleEvent::PuzzleActivated { id: "a".into() });
        bus.publish(solved("a"));
        bus.publish(LifecycleEvent::GameComplete);
        assert_eq!(bus.iter_emitted_so_far().count(), 3);

        let drained = bus.finish_frame();

        assert_eq!(drained.len(), 3);
        assert_eq!(bus.iter_emitted_so_far().count(), 0);
        let counts = bus.last_frame_counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.puzzle_solved, 1);
        assert_eq!(counts.game_complete, 1);
    }
}
