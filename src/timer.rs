use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Entry<E> {
    deadline: Duration,
    handle: TimerHandle,
    event: E,
}

/// Cooperative one-shot timers on a virtual clock.
///
/// Nothing fires on its own: the owner advances the clock and pops due
/// events one at a time. Events with the same deadline come out in the order
/// they were scheduled.
pub struct TimerQueue<E> {
    now: Duration,
    next_handle: u64,
    entries: Vec<Entry<E>>, // sorted by (deadline, handle)
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 0,
            entries: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        let deadline = self.now + delay;
        // Handles grow monotonically, so inserting after every entry with a
        // deadline <= ours keeps ties in scheduling order
        let index = self.entries.partition_point(|e| e.deadline <= deadline);
        self.entries.insert(index, Entry { deadline, handle, event });
        handle
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.iter().position(|e| e.handle == handle) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Pops the earliest event due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        if self.entries.first()?.deadline > until {
            return None;
        }
        let entry = self.entries.remove(0);
        self.now = self.now.max(entry.deadline);
        Some(entry.event)
    }

    /// Moves the clock forward once every due event has been handled.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
