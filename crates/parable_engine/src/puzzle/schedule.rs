#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug)]
struct PendingTask<T> {
    id: TaskId,
    remaining: f32,
    payload: T,
}

/// Fixed-delay tasks driven by frame time. Nothing runs on its own: due
/// payloads are handed back from `advance`, oldest first.
#[derive(Debug)]
pub struct DeferredTasks<T> {
    next_id: u64,
    pending: Vec<PendingTask<T>>,
}

impl<T> Default for DeferredTasks<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredTasks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_seconds: f32, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.pending.push(PendingTask {
            id,
            remaining: delay_seconds.max(0.0),
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let index = self.pending.iter().position(|task| task.id == id)?;
        Some(self.pending.remove(index).payload)
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            self.pending[index].remaining -= dt;
            if self.pending[index].remaining <= 0.0 {
                due.push(self.pending.remove(index).payload);
            } else {
                index += 1;
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pending.iter().map(|task| &task.payload)
    }
}
