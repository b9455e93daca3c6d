//! Deadline queue for the engine's cooperative timers.
//!
//! Tasks are plain values; the owner pops the ones that are due and acts on
//! them. Every task is stamped with the generation that was current when it
//! was scheduled. [`Scheduler::cancel_all`] drops the queue and starts a new
//! generation, so handles taken before it can never reach a later task.

use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    deadline: u64,
    id: u64,
    generation: u64,
}

impl TaskHandle {
    pub fn deadline(&self) -> u64 {
        self.deadline
    }
}

#[derive(Debug)]
struct Entry<E> {
    generation: u64,
    task: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BTreeMap<(u64, u64), Entry<E>>,
    next_id: u64,
    generation: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_id: 0,
            generation: 0,
        }
    }

    pub fn schedule_at(&mut self, deadline: u64, task: E) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert(
            (deadline, id),
            Entry {
                generation: self.generation,
                task,
            },
        );
        TaskHandle {
            deadline,
            id,
            generation: self.generation,
        }
    }

    /// Returns false if the task already fired or was cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        self.queue.remove(&(handle.deadline, handle.id)).is_some()
    }

    pub fn cancel_all(&mut self) {
        trace!(
            pending = self.queue.len(),
            generation = self.generation,
            "cancelling all scheduled tasks"
        );
        self.queue.clear();
        self.generation += 1;
    }

    /// Earliest due task, ordered by deadline then scheduling order
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, E)> {
        loop {
            let (&(deadline, _), _) = self.queue.first_key_value()?;
            if deadline > now {
                return None;
            }
            let (_, entry) = self.queue.pop_first()?;
            if entry.generation == self.generation {
                return Some((deadline, entry.task));
            }
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(deadline, _)| deadline)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
